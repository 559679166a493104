//! Error types for the client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The WebSocket connection failed or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server did not complete the handshake in time
    #[error("Handshake timed out after {0} seconds")]
    HandshakeTimeout(u64),

    /// The HTTP poll fallback failed
    #[error("Poll request failed: {0}")]
    Poll(String),

    /// Every reconnection attempt was exhausted
    #[error("Gave up after {0} reconnection attempts")]
    ReconnectExhausted(u32),
}
