//! UseCase: mark a conversation as read.
//!
//! The read transition is round-tripped through the store so the
//! reader's other connections (and the other party) observe it. It is
//! monotonic: once read, nothing in this flow unreads.

use std::sync::Arc;

use renraku_shared::types::{Identity, OrderId, UserId};

use crate::domain::{can_join_order, MessageStore, RepositoryError};
use crate::router::RoomRouter;

use super::error::MarkReadError;

pub struct MarkReadUseCase {
    store: Arc<dyn MessageStore>,
    router: Arc<RoomRouter>,
}

impl MarkReadUseCase {
    pub fn new(store: Arc<dyn MessageStore>, router: Arc<RoomRouter>) -> Self {
        Self { store, router }
    }

    pub async fn execute(
        &self,
        identity: &Identity,
        order_id: OrderId,
    ) -> Result<UserId, MarkReadError> {
        let reader_id = identity
            .user_id()
            .ok_or_else(|| MarkReadError::Authorization(order_id.to_string()))?
            .clone();

        let owner = self
            .store
            .order_owner(&order_id)
            .await
            .map_err(|e| MarkReadError::Store(e.to_string()))?
            .ok_or_else(|| MarkReadError::OrderNotFound(order_id.to_string()))?;

        if !can_join_order(identity, &owner) {
            return Err(MarkReadError::Authorization(order_id.to_string()));
        }

        self.store
            .mark_read(&order_id, &reader_id)
            .await
            .map_err(|e| match e {
                RepositoryError::OrderNotFound(id) => MarkReadError::OrderNotFound(id),
                other => MarkReadError::Store(other.to_string()),
            })?;

        // The reader caught up on the whole conversation, so their
        // personal notification records flip in the same transition.
        self.store
            .mark_notifications_read(&reader_id)
            .await
            .map_err(|e| MarkReadError::Store(e.to_string()))?;

        if let Err(e) = self.router.route_read_receipt(&order_id, &reader_id).await {
            tracing::error!("Read receipt routing failed: {}", e);
        }

        Ok(reader_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::RecordingPusher;
    use crate::domain::MockMessageStore;
    use renraku_shared::types::{Role, RoomId};

    fn customer(id: &str) -> Identity {
        Identity::User {
            user_id: UserId::new(id),
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn test_mark_read_round_trips_to_store_and_rooms() {
        // given:
        let mut store = MockMessageStore::new();
        store
            .expect_order_owner()
            .returning(|_| Ok(Some(UserId::new("alice"))));
        store.expect_mark_read().times(1).returning(|_, _| Ok(()));
        store
            .expect_mark_notifications_read()
            .times(1)
            .returning(|_| Ok(()));
        let pusher = Arc::new(RecordingPusher::default());
        let router = Arc::new(RoomRouter::new(pusher.clone()));
        let usecase = MarkReadUseCase::new(Arc::new(store), router);

        // when:
        let reader = usecase
            .execute(&customer("alice"), OrderId::new("order-1"))
            .await
            .unwrap();

        // then: the receipt reaches the order room and the reader's
        // personal room (other tabs)
        assert_eq!(reader, UserId::new("alice"));
        assert_eq!(
            pusher.emitted_rooms(),
            vec![
                RoomId::Order(OrderId::new("order-1")),
                RoomId::User(UserId::new("alice")),
            ]
        );
    }

    #[tokio::test]
    async fn test_anonymous_mark_read_is_rejected() {
        // given:
        let store = MockMessageStore::new();
        let pusher = Arc::new(RecordingPusher::default());
        let router = Arc::new(RoomRouter::new(pusher));
        let usecase = MarkReadUseCase::new(Arc::new(store), router);

        // when:
        let result = usecase
            .execute(&Identity::Anonymous, OrderId::new("order-1"))
            .await;

        // then:
        assert!(matches!(result, Err(MarkReadError::Authorization(_))));
    }
}
