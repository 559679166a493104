//! Recording doubles for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use renraku_shared::types::RoomId;

use super::{ConnectionId, MessagePushError, PusherChannel, RoomPusher};

/// `RoomPusher` stub that records every interaction.
#[derive(Default)]
pub struct RecordingPusher {
    pub emitted: Mutex<Vec<(RoomId, String)>>,
    pub joined: Mutex<Vec<(ConnectionId, RoomId)>>,
    pub left: Mutex<Vec<(ConnectionId, RoomId)>>,
    pub pushed: Mutex<Vec<(ConnectionId, String)>>,
}

impl RecordingPusher {
    pub fn emitted_rooms(&self) -> Vec<RoomId> {
        self.emitted
            .lock()
            .unwrap()
            .iter()
            .map(|(room, _)| room.clone())
            .collect()
    }

    pub fn joined_rooms(&self) -> Vec<RoomId> {
        self.joined
            .lock()
            .unwrap()
            .iter()
            .map(|(_, room)| room.clone())
            .collect()
    }
}

#[async_trait]
impl RoomPusher for RecordingPusher {
    async fn register_connection(
        &self,
        _connection_id: ConnectionId,
        _sender: PusherChannel,
        _connected_at: i64,
    ) {
    }

    async fn unregister_connection(&self, _connection_id: &ConnectionId) {}

    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room: RoomId,
    ) -> Result<(), MessagePushError> {
        self.joined
            .lock()
            .unwrap()
            .push((connection_id.clone(), room));
        Ok(())
    }

    async fn leave_room(&self, connection_id: &ConnectionId, room: &RoomId) {
        self.left
            .lock()
            .unwrap()
            .push((connection_id.clone(), room.clone()));
    }

    async fn touch(&self, _connection_id: &ConnectionId, _at_millis: i64) {}

    async fn push_to_connection(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        self.pushed
            .lock()
            .unwrap()
            .push((connection_id.clone(), content.to_string()));
        Ok(())
    }

    async fn emit_to_room(&self, room: &RoomId, content: &str) -> usize {
        self.emitted
            .lock()
            .unwrap()
            .push((room.clone(), content.to_string()));
        1
    }

    async fn rooms_snapshot(&self) -> Vec<(RoomId, Vec<ConnectionId>)> {
        Vec::new()
    }
}
