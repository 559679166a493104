//! UseCase: connection teardown.
//!
//! Drops the connection's live routing state. Persisted messages and
//! notifications are untouched; the gateway deliberately forgets room
//! membership, so a reconnecting client must rejoin explicitly.

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomPusher};

pub struct DisconnectUseCase {
    pusher: Arc<dyn RoomPusher>,
}

impl DisconnectUseCase {
    pub fn new(pusher: Arc<dyn RoomPusher>) -> Self {
        Self { pusher }
    }

    pub async fn execute(&self, connection_id: &ConnectionId) {
        self.pusher.unregister_connection(connection_id).await;
        tracing::info!("Connection '{}' disconnected", connection_id);
    }
}
