//! Domain-layer error types.

use thiserror::Error;

/// Failures of the persistent store boundary.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The store could not be reached or answered abnormally.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The referenced order does not exist.
    #[error("order '{0}' not found")]
    OrderNotFound(String),
}

/// Failures of the live push transport.
#[derive(Debug, Clone, Error)]
pub enum MessagePushError {
    /// The connection's outbound channel is gone.
    #[error("connection '{0}' is no longer reachable")]
    ConnectionClosed(String),

    /// The connection is not registered with the pusher.
    #[error("connection '{0}' is not registered")]
    UnknownConnection(String),
}
