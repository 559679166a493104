//! Live push transport interface.
//!
//! The gateway/router layers depend on this trait, never on the
//! WebSocket machinery directly. The concrete implementation owns the
//! process-wide connection/room registry; no other component mutates
//! membership.

use async_trait::async_trait;
use tokio::sync::mpsc;

use renraku_shared::types::RoomId;

use super::{ConnectionId, MessagePushError};

/// Outbound channel of one connection. The UI layer creates it during
/// the upgrade and drains it into the WebSocket sink.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Registry of live connections and their room memberships, plus the
/// fan-out primitive the router uses.
#[async_trait]
pub trait RoomPusher: Send + Sync {
    /// Register a freshly upgraded connection.
    async fn register_connection(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
        connected_at: i64,
    );

    /// Remove a connection and all of its room memberships. Dropping a
    /// connection deletes live routing state only, never persisted data.
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// Add the connection to a room.
    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room: RoomId,
    ) -> Result<(), MessagePushError>;

    /// Remove the connection from a room.
    async fn leave_room(&self, connection_id: &ConnectionId, room: &RoomId);

    /// Refresh the connection's liveness timestamp.
    async fn touch(&self, connection_id: &ConnectionId, at_millis: i64);

    /// Send a frame to a single connection.
    async fn push_to_connection(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Send a frame to every current member of a room. A room with zero
    /// members is a no-op. Returns the number of connections reached.
    async fn emit_to_room(&self, room: &RoomId, content: &str) -> usize;

    /// Current membership index, for diagnostics.
    async fn rooms_snapshot(&self) -> Vec<(RoomId, Vec<ConnectionId>)>;
}
