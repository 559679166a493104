//! In-memory `MessageStore` implementation.
//!
//! HashMaps behind one mutex stand in for the platform's relational
//! store. Orders are seeded (the commerce layer creating them is out
//! of scope); messages and notifications are append-only, mutated only
//! by the read-flag transition.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use renraku_shared::time::Clock;
use renraku_shared::types::{
    Message, MessageKind, Notification, NotificationKind, NotificationTarget, OrderId, UserId,
};

use crate::domain::{MessageStore, RepositoryError};

#[derive(Default)]
struct StoreState {
    /// order id -> owner
    orders: HashMap<OrderId, UserId>,
    /// order id -> append-ordered message log
    messages: HashMap<OrderId, Vec<Message>>,
    /// append-ordered notification log (collective records stored once)
    notifications: Vec<Notification>,
}

pub struct InMemoryStore {
    state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            clock,
        }
    }

    /// Register an order and its owner. Dev/test substitute for the
    /// out-of-scope order-creation collaborator.
    pub async fn seed_order(&self, order_id: OrderId, owner: UserId) {
        let mut state = self.state.lock().await;
        state.orders.insert(order_id, owner);
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn create_message(
        &self,
        order_id: OrderId,
        sender_id: UserId,
        body: String,
        kind: MessageKind,
    ) -> Result<Message, RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.orders.contains_key(&order_id) {
            return Err(RepositoryError::OrderNotFound(order_id.to_string()));
        }

        let message = Message {
            id: format!("msg-{}", Uuid::new_v4()),
            order_id: order_id.clone(),
            sender_id,
            body,
            kind,
            delivered: true,
            read: false,
            created_at: self.clock.now_millis(),
        };
        state
            .messages
            .entry(order_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn list_messages(
        &self,
        order_id: &OrderId,
        limit: usize,
        since_id: Option<String>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.lock().await;
        if !state.orders.contains_key(order_id) {
            return Err(RepositoryError::OrderNotFound(order_id.to_string()));
        }

        let log = state.messages.get(order_id).map(Vec::as_slice).unwrap_or(&[]);
        let start = match since_id {
            Some(ref id) => log
                .iter()
                .position(|m| &m.id == id)
                .map(|pos| pos + 1)
                .unwrap_or(0),
            None => 0,
        };
        let tail = &log[start..];
        let skip = tail.len().saturating_sub(limit);
        Ok(tail[skip..].to_vec())
    }

    async fn mark_read(
        &self,
        order_id: &OrderId,
        reader_id: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.orders.contains_key(order_id) {
            return Err(RepositoryError::OrderNotFound(order_id.to_string()));
        }

        if let Some(log) = state.messages.get_mut(order_id) {
            for message in log.iter_mut().filter(|m| &m.sender_id != reader_id) {
                message.read = true;
            }
        }
        Ok(())
    }

    async fn create_notification(
        &self,
        kind: NotificationKind,
        target: NotificationTarget,
        payload: serde_json::Value,
    ) -> Result<Notification, RepositoryError> {
        let mut state = self.state.lock().await;
        let notification = Notification {
            id: format!("ntf-{}", Uuid::new_v4()),
            kind,
            target,
            payload,
            read: false,
            created_at: self.clock.now_millis(),
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        target: &NotificationTarget,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| &n.target == target)
            .cloned()
            .collect())
    }

    async fn mark_notifications_read(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let target = NotificationTarget::User {
            user_id: user_id.clone(),
        };
        for notification in state.notifications.iter_mut().filter(|n| n.target == target) {
            notification.read = true;
        }
        Ok(())
    }

    async fn order_owner(&self, order_id: &OrderId) -> Result<Option<UserId>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.orders.get(order_id).cloned())
    }
}
