//! UseCase: authorized message listing.
//!
//! Backs the HTTP poll path clients fall back to while their live
//! transport is down. Same access rule as the room join.

use std::sync::Arc;

use renraku_shared::types::{Identity, Message, OrderId};

use crate::domain::{can_join_order, MessageStore, RepositoryError};

use super::error::ListMessagesError;

pub struct ListMessagesUseCase {
    store: Arc<dyn MessageStore>,
}

impl ListMessagesUseCase {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        identity: &Identity,
        order_id: OrderId,
        limit: usize,
        since_id: Option<String>,
    ) -> Result<Vec<Message>, ListMessagesError> {
        let owner = self
            .store
            .order_owner(&order_id)
            .await
            .map_err(|e| ListMessagesError::Store(e.to_string()))?
            .ok_or_else(|| ListMessagesError::OrderNotFound(order_id.to_string()))?;

        if !can_join_order(identity, &owner) {
            return Err(ListMessagesError::Authorization(order_id.to_string()));
        }

        self.store
            .list_messages(&order_id, limit, since_id)
            .await
            .map_err(|e| match e {
                RepositoryError::OrderNotFound(id) => ListMessagesError::OrderNotFound(id),
                other => ListMessagesError::Store(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockMessageStore;
    use renraku_shared::types::{Role, UserId};

    #[tokio::test]
    async fn test_owner_can_poll_messages() {
        // given:
        let mut store = MockMessageStore::new();
        store
            .expect_order_owner()
            .returning(|_| Ok(Some(UserId::new("alice"))));
        store
            .expect_list_messages()
            .returning(|_, _, _| Ok(Vec::new()));
        let usecase = ListMessagesUseCase::new(Arc::new(store));
        let identity = Identity::User {
            user_id: UserId::new("alice"),
            role: Role::Customer,
        };

        // when:
        let result = usecase
            .execute(&identity, OrderId::new("order-1"), 50, None)
            .await;

        // then:
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_customer_poll_is_rejected() {
        // given:
        let mut store = MockMessageStore::new();
        store
            .expect_order_owner()
            .returning(|_| Ok(Some(UserId::new("alice"))));
        let usecase = ListMessagesUseCase::new(Arc::new(store));
        let identity = Identity::User {
            user_id: UserId::new("bob"),
            role: Role::Customer,
        };

        // when:
        let result = usecase
            .execute(&identity, OrderId::new("order-1"), 50, None)
            .await;

        // then:
        assert!(matches!(result, Err(ListMessagesError::Authorization(_))));
    }
}
