//! Persistent store interface.
//!
//! The durable message/notification log is an external collaborator;
//! this trait is the seam. The store is the single source of truth —
//! everything the gateway holds in memory is a disposable cache that
//! can be rebuilt from here.

use async_trait::async_trait;

use renraku_shared::types::{
    Message, MessageKind, Notification, NotificationKind, NotificationTarget, OrderId, UserId,
};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one message to the order's log and return the
    /// authoritative record (server-assigned id, creation timestamp).
    async fn create_message(
        &self,
        order_id: OrderId,
        sender_id: UserId,
        body: String,
        kind: MessageKind,
    ) -> Result<Message, RepositoryError>;

    /// Most recent messages of an order in ascending creation order,
    /// capped at `limit`. `since_id` restricts the result to messages
    /// created after the given message.
    async fn list_messages(
        &self,
        order_id: &OrderId,
        limit: usize,
        since_id: Option<String>,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// Flag every message of the order not authored by `reader_id` as
    /// read. Monotonic: once read, never unread by this flow.
    async fn mark_read(&self, order_id: &OrderId, reader_id: &UserId)
        -> Result<(), RepositoryError>;

    /// Create one notification record. A collective admin target
    /// produces exactly one record, never one per admin.
    async fn create_notification(
        &self,
        kind: NotificationKind,
        target: NotificationTarget,
        payload: serde_json::Value,
    ) -> Result<Notification, RepositoryError>;

    /// Notifications visible to the given target, ascending by
    /// creation time.
    async fn list_notifications(
        &self,
        target: &NotificationTarget,
    ) -> Result<Vec<Notification>, RepositoryError>;

    /// Flag the user's notification records as read. Collective admin
    /// records are shared across the whole role and keep their flag;
    /// per-admin read state lives outside the core.
    async fn mark_notifications_read(&self, user_id: &UserId) -> Result<(), RepositoryError>;

    /// Owner of an order, or `None` if the order does not exist. Order
    /// creation itself belongs to the (external) commerce layer.
    async fn order_owner(&self, order_id: &OrderId) -> Result<Option<UserId>, RepositoryError>;
}
