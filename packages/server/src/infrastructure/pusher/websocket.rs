//! WebSocket-backed `RoomPusher`.
//!
//! Owns the process-wide registry of live connections and room
//! memberships. Connection handlers for different sockets interleave
//! freely, so membership and fan-out go through one mutex-guarded
//! registry instead of per-connection locks.
//!
//! The WebSocket itself is created in the UI layer; this implementation
//! only holds each connection's `UnboundedSender` and drives fan-out.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use renraku_shared::types::RoomId;

use crate::domain::{ConnectionId, MessagePushError, PusherChannel, RoomPusher};

struct ConnectionEntry {
    sender: PusherChannel,
    rooms: HashSet<RoomId>,
    /// Liveness timestamp, millis. Refreshed on every inbound frame.
    last_seen_at: i64,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl Registry {
    fn remove_membership(&mut self, connection_id: &ConnectionId, room: &RoomId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(connection_id);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }
}

#[derive(Default)]
pub struct WebSocketRoomPusher {
    registry: Mutex<Registry>,
}

impl WebSocketRoomPusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomPusher for WebSocketRoomPusher {
    async fn register_connection(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
        connected_at: i64,
    ) {
        let mut registry = self.registry.lock().await;
        registry.connections.insert(
            connection_id.clone(),
            ConnectionEntry {
                sender,
                rooms: HashSet::new(),
                last_seen_at: connected_at,
            },
        );
        tracing::debug!("Connection '{}' registered", connection_id);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut registry = self.registry.lock().await;
        if let Some(entry) = registry.connections.remove(connection_id) {
            for room in entry.rooms {
                registry.remove_membership(connection_id, &room);
            }
        }
        tracing::debug!("Connection '{}' unregistered", connection_id);
    }

    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room: RoomId,
    ) -> Result<(), MessagePushError> {
        let mut registry = self.registry.lock().await;
        let entry = registry
            .connections
            .get_mut(connection_id)
            .ok_or_else(|| MessagePushError::UnknownConnection(connection_id.to_string()))?;
        entry.rooms.insert(room.clone());
        registry
            .rooms
            .entry(room.clone())
            .or_default()
            .insert(connection_id.clone());
        tracing::debug!("Connection '{}' joined {}", connection_id, room);
        Ok(())
    }

    async fn leave_room(&self, connection_id: &ConnectionId, room: &RoomId) {
        let mut registry = self.registry.lock().await;
        if let Some(entry) = registry.connections.get_mut(connection_id) {
            entry.rooms.remove(room);
        }
        registry.remove_membership(connection_id, room);
        tracing::debug!("Connection '{}' left {}", connection_id, room);
    }

    async fn touch(&self, connection_id: &ConnectionId, at_millis: i64) {
        let mut registry = self.registry.lock().await;
        if let Some(entry) = registry.connections.get_mut(connection_id) {
            entry.last_seen_at = entry.last_seen_at.max(at_millis);
        }
    }

    async fn push_to_connection(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let registry = self.registry.lock().await;
        let entry = registry
            .connections
            .get(connection_id)
            .ok_or_else(|| MessagePushError::UnknownConnection(connection_id.to_string()))?;
        entry
            .sender
            .send(content.to_string())
            .map_err(|_| MessagePushError::ConnectionClosed(connection_id.to_string()))
    }

    async fn emit_to_room(&self, room: &RoomId, content: &str) -> usize {
        let registry = self.registry.lock().await;
        let Some(members) = registry.rooms.get(room) else {
            // Zero members: the event is already persisted, so this is
            // a deliberate no-op, not a loss.
            return 0;
        };

        let mut reached = 0;
        for connection_id in members {
            if let Some(entry) = registry.connections.get(connection_id) {
                if entry.sender.send(content.to_string()).is_ok() {
                    reached += 1;
                } else {
                    // Cleanup happens when the socket task unregisters.
                    tracing::warn!(
                        "Failed to push to connection '{}' in {}",
                        connection_id,
                        room
                    );
                }
            }
        }
        reached
    }

    async fn rooms_snapshot(&self) -> Vec<(RoomId, Vec<ConnectionId>)> {
        let registry = self.registry.lock().await;
        registry
            .rooms
            .iter()
            .map(|(room, members)| (room.clone(), members.iter().cloned().collect()))
            .collect()
    }
}
