//! UseCase: order-room join.
//!
//! Authorization first (owner or admin, never anonymous), then the
//! membership record, then the history snapshot. A store failure while
//! fetching the snapshot degrades to an empty snapshot with an error
//! marker — it never blocks the join itself.

use std::sync::Arc;

use renraku_shared::types::{Identity, Message, OrderId, RoomId};

use crate::domain::{can_join_order, ConnectionId, MessageStore, RepositoryError, RoomPusher};

use super::error::JoinOrderRoomError;

/// How many persisted messages the initial snapshot carries.
pub const SNAPSHOT_LIMIT: usize = 50;

/// Result of a successful join.
pub struct JoinOutcome {
    /// Most recent messages, ascending by creation time. Empty if the
    /// snapshot fetch degraded.
    pub messages: Vec<Message>,
    /// Set when membership was recorded but the snapshot fetch failed.
    pub snapshot_error: Option<RepositoryError>,
}

pub struct JoinOrderRoomUseCase {
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn RoomPusher>,
}

impl JoinOrderRoomUseCase {
    pub fn new(store: Arc<dyn MessageStore>, pusher: Arc<dyn RoomPusher>) -> Self {
        Self { store, pusher }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        identity: &Identity,
        order_id: OrderId,
    ) -> Result<JoinOutcome, JoinOrderRoomError> {
        // 1. Resolve ownership. Without it the join cannot be
        //    authorized, so this lookup is the one store call that must
        //    succeed.
        let owner = self
            .store
            .order_owner(&order_id)
            .await
            .map_err(|e| JoinOrderRoomError::Store(e.to_string()))?
            .ok_or_else(|| JoinOrderRoomError::OrderNotFound(order_id.to_string()))?;

        // 2. Authorize. Failure leaves membership untouched.
        if !can_join_order(identity, &owner) {
            tracing::warn!(
                "Connection '{}' denied access to order '{}'",
                connection_id,
                order_id
            );
            return Err(JoinOrderRoomError::Authorization(order_id.to_string()));
        }

        // 3. Record membership.
        self.pusher
            .join_room(connection_id, RoomId::Order(order_id.clone()))
            .await
            .map_err(|_| JoinOrderRoomError::UnknownConnection)?;

        // 4. Snapshot, degrading on store failure.
        match self
            .store
            .list_messages(&order_id, SNAPSHOT_LIMIT, None)
            .await
        {
            Ok(messages) => Ok(JoinOutcome {
                messages,
                snapshot_error: None,
            }),
            Err(e) => {
                tracing::error!(
                    "Snapshot fetch for order '{}' failed, joining with empty history: {}",
                    order_id,
                    e
                );
                Ok(JoinOutcome {
                    messages: Vec::new(),
                    snapshot_error: Some(e),
                })
            }
        }
    }
}
