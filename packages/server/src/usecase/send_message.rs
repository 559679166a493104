//! UseCase: message send.
//!
//! Persist first, route second — offline recipients recover from the
//! store, live recipients get the fan-out. Both steps happen under one
//! ordering lock so every room member observes messages in persisted
//! order even when sends from different connections interleave.

use std::sync::Arc;

use tokio::sync::Mutex;

use renraku_shared::types::{
    Identity, Message, MessageKind, NotificationKind, NotificationTarget, OrderId,
};

use crate::domain::{can_join_order, MessageStore, RepositoryError};
use crate::router::RoomRouter;

use super::error::SendMessageError;

pub struct SendMessageUseCase {
    store: Arc<dyn MessageStore>,
    router: Arc<RoomRouter>,
    /// Serializes persist+route so emission order matches persisted order.
    ordering: Mutex<()>,
}

impl SendMessageUseCase {
    pub fn new(store: Arc<dyn MessageStore>, router: Arc<RoomRouter>) -> Self {
        Self {
            store,
            router,
            ordering: Mutex::new(()),
        }
    }

    /// Persist and fan out one message. Returns the authoritative
    /// record so the caller can acknowledge the sender's optimistic
    /// entry.
    pub async fn execute(
        &self,
        identity: &Identity,
        order_id: OrderId,
        body: String,
        kind: MessageKind,
    ) -> Result<Message, SendMessageError> {
        let sender_id = identity
            .user_id()
            .ok_or_else(|| SendMessageError::Authorization(order_id.to_string()))?
            .clone();

        let owner = self
            .store
            .order_owner(&order_id)
            .await
            .map_err(|e| SendMessageError::Store(e.to_string()))?
            .ok_or_else(|| SendMessageError::OrderNotFound(order_id.to_string()))?;

        if !can_join_order(identity, &owner) {
            return Err(SendMessageError::Authorization(order_id.to_string()));
        }

        let _ordering = self.ordering.lock().await;

        let message = self
            .store
            .create_message(order_id.clone(), sender_id.clone(), body, kind)
            .await
            .map_err(|e| match e {
                RepositoryError::OrderNotFound(id) => SendMessageError::OrderNotFound(id),
                other => SendMessageError::Store(other.to_string()),
            })?;

        self.router
            .route_message(&message, identity.is_admin(), &owner)
            .await
            .map_err(|e| SendMessageError::Store(e.to_string()))?;

        // A customer message additionally raises one collective admin
        // notification; the admins' transport fan-out happens in the
        // router, so a single record suffices.
        if !identity.is_admin() {
            let payload = serde_json::json!({
                "order_id": order_id,
                "message_id": message.id,
                "sender_id": sender_id,
            });
            match self
                .store
                .create_notification(
                    NotificationKind::MessageReceived,
                    NotificationTarget::AdminCollective,
                    payload,
                )
                .await
            {
                Ok(notification) => {
                    if let Err(e) = self.router.route_notification(&notification).await {
                        tracing::error!("Admin notification routing failed: {}", e);
                    }
                }
                // The message itself is already persisted and routed;
                // the advisory notification degrading is not a send
                // failure.
                Err(e) => tracing::error!("Admin notification persist failed: {}", e),
            }
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::RecordingPusher;
    use crate::domain::MockMessageStore;
    use renraku_shared::types::{Notification, Role, RoomId, UserId};

    fn customer(id: &str) -> Identity {
        Identity::User {
            user_id: UserId::new(id),
            role: Role::Customer,
        }
    }

    fn admin(id: &str) -> Identity {
        Identity::User {
            user_id: UserId::new(id),
            role: Role::Admin,
        }
    }

    fn persisted(order: &str, sender: &str, body: &str) -> Message {
        Message {
            id: "msg-1".to_string(),
            order_id: OrderId::new(order),
            sender_id: UserId::new(sender),
            body: body.to_string(),
            kind: MessageKind::Text,
            delivered: true,
            read: false,
            created_at: 1000,
        }
    }

    fn persisted_notification() -> Notification {
        Notification {
            id: "ntf-1".to_string(),
            kind: NotificationKind::MessageReceived,
            target: NotificationTarget::AdminCollective,
            payload: serde_json::json!({}),
            read: false,
            created_at: 1000,
        }
    }

    #[tokio::test]
    async fn test_customer_send_routes_message_and_admin_notification() {
        // given:
        let mut store = MockMessageStore::new();
        store
            .expect_order_owner()
            .returning(|_| Ok(Some(UserId::new("alice"))));
        store
            .expect_create_message()
            .returning(|order, sender, body, _| {
                Ok(persisted(order.as_str(), sender.as_str(), &body))
            });
        store
            .expect_create_notification()
            .times(1)
            .returning(|_, _, _| Ok(persisted_notification()));
        let pusher = Arc::new(RecordingPusher::default());
        let router = Arc::new(RoomRouter::new(pusher.clone()));
        let usecase = SendMessageUseCase::new(Arc::new(store), router);

        // when:
        let message = usecase
            .execute(
                &customer("alice"),
                OrderId::new("order-1"),
                "hello".to_string(),
                MessageKind::Text,
            )
            .await
            .unwrap();

        // then: order room gets the message, admin room gets the
        // advisory notification
        assert_eq!(message.body, "hello");
        assert_eq!(
            pusher.emitted_rooms(),
            vec![RoomId::Order(OrderId::new("order-1")), RoomId::Admin]
        );
    }

    #[tokio::test]
    async fn test_admin_send_reaches_owner_room_without_notification() {
        // given:
        let mut store = MockMessageStore::new();
        store
            .expect_order_owner()
            .returning(|_| Ok(Some(UserId::new("alice"))));
        store
            .expect_create_message()
            .returning(|order, sender, body, _| {
                Ok(persisted(order.as_str(), sender.as_str(), &body))
            });
        store.expect_create_notification().times(0);
        let pusher = Arc::new(RecordingPusher::default());
        let router = Arc::new(RoomRouter::new(pusher.clone()));
        let usecase = SendMessageUseCase::new(Arc::new(store), router);

        // when:
        usecase
            .execute(
                &admin("carol"),
                OrderId::new("order-1"),
                "on it".to_string(),
                MessageKind::Text,
            )
            .await
            .unwrap();

        // then: the owner's personal room is covered even though they
        // have not joined the order room
        assert_eq!(
            pusher.emitted_rooms(),
            vec![
                RoomId::Order(OrderId::new("order-1")),
                RoomId::User(UserId::new("alice")),
            ]
        );
    }

    #[tokio::test]
    async fn test_anonymous_send_is_rejected() {
        // given:
        let store = MockMessageStore::new();
        let pusher = Arc::new(RecordingPusher::default());
        let router = Arc::new(RoomRouter::new(pusher.clone()));
        let usecase = SendMessageUseCase::new(Arc::new(store), router);

        // when:
        let result = usecase
            .execute(
                &Identity::Anonymous,
                OrderId::new("order-1"),
                "hello".to_string(),
                MessageKind::Text,
            )
            .await;

        // then:
        assert!(matches!(result, Err(SendMessageError::Authorization(_))));
        assert!(pusher.emitted_rooms().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_foreign_order_is_rejected_before_persist() {
        // given:
        let mut store = MockMessageStore::new();
        store
            .expect_order_owner()
            .returning(|_| Ok(Some(UserId::new("alice"))));
        store.expect_create_message().times(0);
        let pusher = Arc::new(RecordingPusher::default());
        let router = Arc::new(RoomRouter::new(pusher.clone()));
        let usecase = SendMessageUseCase::new(Arc::new(store), router);

        // when:
        let result = usecase
            .execute(
                &customer("bob"),
                OrderId::new("order-1"),
                "hello".to_string(),
                MessageKind::Text,
            )
            .await;

        // then:
        assert!(matches!(result, Err(SendMessageError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_notification_persist_failure_does_not_fail_the_send() {
        // given: message persists fine, notification store hiccups
        let mut store = MockMessageStore::new();
        store
            .expect_order_owner()
            .returning(|_| Ok(Some(UserId::new("alice"))));
        store
            .expect_create_message()
            .returning(|order, sender, body, _| {
                Ok(persisted(order.as_str(), sender.as_str(), &body))
            });
        store
            .expect_create_notification()
            .returning(|_, _, _| Err(RepositoryError::Unavailable("down".to_string())));
        let pusher = Arc::new(RecordingPusher::default());
        let router = Arc::new(RoomRouter::new(pusher.clone()));
        let usecase = SendMessageUseCase::new(Arc::new(store), router);

        // when:
        let result = usecase
            .execute(
                &customer("alice"),
                OrderId::new("order-1"),
                "hello".to_string(),
                MessageKind::Text,
            )
            .await;

        // then: the send itself still succeeds
        assert!(result.is_ok());
    }
}
