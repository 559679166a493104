//! UseCase: order status change.
//!
//! Admin-only. Persists a `StatusUpdated` notification for the owner
//! and pushes the status event to the conversation and the owner's
//! personal room.

use std::sync::Arc;

use renraku_shared::types::{
    Identity, Notification, NotificationKind, NotificationTarget, OrderId,
};

use crate::domain::MessageStore;
use crate::router::RoomRouter;

use super::error::UpdateOrderStatusError;

pub struct UpdateOrderStatusUseCase {
    store: Arc<dyn MessageStore>,
    router: Arc<RoomRouter>,
}

impl UpdateOrderStatusUseCase {
    pub fn new(store: Arc<dyn MessageStore>, router: Arc<RoomRouter>) -> Self {
        Self { store, router }
    }

    pub async fn execute(
        &self,
        identity: &Identity,
        order_id: OrderId,
        status: String,
    ) -> Result<Notification, UpdateOrderStatusError> {
        if !identity.is_admin() {
            return Err(UpdateOrderStatusError::Authorization);
        }

        let owner = self
            .store
            .order_owner(&order_id)
            .await
            .map_err(|e| UpdateOrderStatusError::Store(e.to_string()))?
            .ok_or_else(|| UpdateOrderStatusError::OrderNotFound(order_id.to_string()))?;

        let notification = self
            .store
            .create_notification(
                NotificationKind::StatusUpdated,
                NotificationTarget::User {
                    user_id: owner.clone(),
                },
                serde_json::json!({ "order_id": order_id, "status": status }),
            )
            .await
            .map_err(|e| UpdateOrderStatusError::Store(e.to_string()))?;

        if let Err(e) = self.router.route_notification(&notification).await {
            tracing::error!("Status notification routing failed: {}", e);
        }
        if let Err(e) = self
            .router
            .route_status_update(&order_id, &owner, &status)
            .await
        {
            tracing::error!("Status event routing failed: {}", e);
        }

        Ok(notification)
    }
}
