//! UseCase: notification listing for one identity.
//!
//! Admins see the collective feed plus their personal records;
//! customers see their personal records only.

use std::sync::Arc;

use renraku_shared::types::{Identity, Notification, NotificationTarget};

use crate::domain::MessageStore;

use super::error::ListMessagesError;

pub struct ListNotificationsUseCase {
    store: Arc<dyn MessageStore>,
}

impl ListNotificationsUseCase {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Notification>, ListMessagesError> {
        let user_id = identity
            .user_id()
            .ok_or_else(|| ListMessagesError::Authorization("notifications".to_string()))?
            .clone();

        let mut notifications = self
            .store
            .list_notifications(&NotificationTarget::User { user_id })
            .await
            .map_err(|e| ListMessagesError::Store(e.to_string()))?;

        if identity.is_admin() {
            let collective = self
                .store
                .list_notifications(&NotificationTarget::AdminCollective)
                .await
                .map_err(|e| ListMessagesError::Store(e.to_string()))?;
            notifications.extend(collective);
            notifications.sort_by_key(|n| n.created_at);
        }

        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockMessageStore;
    use renraku_shared::types::{NotificationKind, Role, UserId};

    fn record(id: &str, target: NotificationTarget, created_at: i64) -> Notification {
        Notification {
            id: id.to_string(),
            kind: NotificationKind::MessageReceived,
            target,
            payload: serde_json::json!({}),
            read: false,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_admin_sees_collective_and_personal_merged_in_order() {
        // given:
        let mut store = MockMessageStore::new();
        store.expect_list_notifications().returning(|target| {
            Ok(match target {
                NotificationTarget::AdminCollective => {
                    vec![record("ntf-2", NotificationTarget::AdminCollective, 2000)]
                }
                NotificationTarget::User { user_id } => vec![record(
                    "ntf-1",
                    NotificationTarget::User {
                        user_id: user_id.clone(),
                    },
                    1000,
                )],
            })
        });
        let usecase = ListNotificationsUseCase::new(Arc::new(store));
        let identity = Identity::User {
            user_id: UserId::new("carol"),
            role: Role::Admin,
        };

        // when:
        let notifications = usecase.execute(&identity).await.unwrap();

        // then:
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].id, "ntf-1");
        assert_eq!(notifications[1].id, "ntf-2");
    }

    #[tokio::test]
    async fn test_anonymous_cannot_list_notifications() {
        // given:
        let store = MockMessageStore::new();
        let usecase = ListNotificationsUseCase::new(Arc::new(store));

        // when / then:
        assert!(usecase.execute(&Identity::Anonymous).await.is_err());
    }
}
