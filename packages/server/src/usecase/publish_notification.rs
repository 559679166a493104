//! UseCase: publish a notification.
//!
//! The entry point the surrounding platform's order/payment
//! collaborators call. The notification kind is an explicit input —
//! the messaging core never re-derives "order created" vs "payment
//! confirmed" from payment ids.

use std::sync::Arc;

use renraku_shared::types::{Notification, NotificationKind, NotificationTarget};

use crate::domain::MessageStore;
use crate::router::RoomRouter;

use super::error::PublishNotificationError;

pub struct PublishNotificationUseCase {
    store: Arc<dyn MessageStore>,
    router: Arc<RoomRouter>,
}

impl PublishNotificationUseCase {
    pub fn new(store: Arc<dyn MessageStore>, router: Arc<RoomRouter>) -> Self {
        Self { store, router }
    }

    /// Persist exactly one record (collective targets included), then
    /// fan it out to the target scope.
    pub async fn execute(
        &self,
        kind: NotificationKind,
        target: NotificationTarget,
        payload: serde_json::Value,
    ) -> Result<Notification, PublishNotificationError> {
        let notification = self
            .store
            .create_notification(kind, target, payload)
            .await
            .map_err(|e| PublishNotificationError::Store(e.to_string()))?;

        if let Err(e) = self.router.route_notification(&notification).await {
            tracing::error!("Notification routing failed: {}", e);
        }

        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::RecordingPusher;
    use crate::infrastructure::store::InMemoryStore;
    use renraku_shared::time::FixedClock;
    use renraku_shared::types::RoomId;

    #[tokio::test]
    async fn test_payment_confirmed_with_many_admins_stores_one_record() {
        // given: a real in-memory store, so record counts are observable
        let store = Arc::new(InMemoryStore::new(Arc::new(FixedClock::new(1000))));
        let pusher = Arc::new(RecordingPusher::default());
        let router = Arc::new(RoomRouter::new(pusher.clone()));
        let usecase = PublishNotificationUseCase::new(store.clone(), router);

        // when: one payment-confirmed event while N admins are online
        usecase
            .execute(
                NotificationKind::PaymentReceived,
                NotificationTarget::AdminCollective,
                serde_json::json!({ "order_id": "order-1" }),
            )
            .await
            .unwrap();

        // then: one record, one admin-room emission
        use crate::domain::MessageStore;
        let records = store
            .list_notifications(&NotificationTarget::AdminCollective)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(pusher.emitted_rooms(), vec![RoomId::Admin]);
    }
}
