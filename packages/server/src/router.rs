//! Room router: resolves an outbound event to its target rooms and
//! performs the fan-out through the pusher.
//!
//! Events reaching the router are already durably persisted, so a
//! zero-member room is a silent no-op — offline recipients catch up
//! through the next room-join snapshot or the poll path.

use std::sync::Arc;

use renraku_shared::protocol::ServerEvent;
use renraku_shared::types::{Message, Notification, NotificationTarget, OrderId, RoomId, UserId};

use crate::domain::RoomPusher;

pub struct RoomRouter {
    pusher: Arc<dyn RoomPusher>,
}

impl RoomRouter {
    pub fn new(pusher: Arc<dyn RoomPusher>) -> Self {
        Self { pusher }
    }

    /// Fan a persisted message out to its conversation room.
    ///
    /// An admin-authored message is additionally pushed to the owner's
    /// personal room: the owner may not have joined the order room yet
    /// (e.g. not currently looking at the chat), and must still see it.
    /// Returns the rooms that were targeted.
    pub async fn route_message(
        &self,
        message: &Message,
        sender_is_admin: bool,
        owner_id: &UserId,
    ) -> Result<Vec<RoomId>, serde_json::Error> {
        let frame = serde_json::to_string(&ServerEvent::NewMessage {
            message: message.clone(),
        })?;

        let order_room = RoomId::Order(message.order_id.clone());
        let mut targeted = vec![order_room.clone()];
        let reached = self.pusher.emit_to_room(&order_room, &frame).await;
        tracing::debug!(
            "Routed message '{}' to {} ({} connections)",
            message.id,
            order_room,
            reached
        );

        if sender_is_admin {
            let owner_room = RoomId::User(owner_id.clone());
            self.pusher.emit_to_room(&owner_room, &frame).await;
            targeted.push(owner_room);
        }

        Ok(targeted)
    }

    /// Fan a persisted notification out to its target scope.
    ///
    /// A collective admin notification is emitted once to the `admin`
    /// room; fan-out to the individual admin connections happens at the
    /// transport layer. This is what keeps N admins from producing N
    /// notification records.
    pub async fn route_notification(
        &self,
        notification: &Notification,
    ) -> Result<RoomId, serde_json::Error> {
        let frame = serde_json::to_string(&ServerEvent::NewNotification {
            notification: notification.clone(),
        })?;

        let room = match &notification.target {
            NotificationTarget::User { user_id } => RoomId::User(user_id.clone()),
            NotificationTarget::AdminCollective => RoomId::Admin,
        };
        let reached = self.pusher.emit_to_room(&room, &frame).await;
        tracing::debug!(
            "Routed notification '{}' to {} ({} connections)",
            notification.id,
            room,
            reached
        );

        Ok(room)
    }

    /// Echo a read-state change to the conversation room and to every
    /// connection of the reader (other tabs of the same user must
    /// observe the reset too).
    pub async fn route_read_receipt(
        &self,
        order_id: &OrderId,
        reader_id: &UserId,
    ) -> Result<(), serde_json::Error> {
        let frame = serde_json::to_string(&ServerEvent::MessagesMarkedRead {
            order_id: order_id.clone(),
            reader_id: reader_id.clone(),
        })?;

        self.pusher
            .emit_to_room(&RoomId::Order(order_id.clone()), &frame)
            .await;
        self.pusher
            .emit_to_room(&RoomId::User(reader_id.clone()), &frame)
            .await;

        Ok(())
    }

    /// Push an order lifecycle change to the conversation room and to
    /// the owner's personal room.
    pub async fn route_status_update(
        &self,
        order_id: &OrderId,
        owner_id: &UserId,
        status: &str,
    ) -> Result<(), serde_json::Error> {
        let frame = serde_json::to_string(&ServerEvent::OrderStatusUpdated {
            order_id: order_id.clone(),
            status: status.to_string(),
        })?;

        self.pusher
            .emit_to_room(&RoomId::Order(order_id.clone()), &frame)
            .await;
        self.pusher
            .emit_to_room(&RoomId::User(owner_id.clone()), &frame)
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::RecordingPusher;
    use renraku_shared::types::{MessageKind, NotificationKind};

    fn test_message(sender: &str) -> Message {
        Message {
            id: "msg-1".to_string(),
            order_id: OrderId::new("order-1"),
            sender_id: UserId::new(sender),
            body: "hello".to_string(),
            kind: MessageKind::Text,
            delivered: false,
            read: false,
            created_at: 1000,
        }
    }

    #[tokio::test]
    async fn test_customer_message_targets_order_room_only() {
        // given:
        let pusher = Arc::new(RecordingPusher::default());
        let router = RoomRouter::new(pusher.clone());
        let message = test_message("alice");

        // when:
        let targeted = router
            .route_message(&message, false, &UserId::new("alice"))
            .await
            .unwrap();

        // then:
        assert_eq!(targeted, vec![RoomId::Order(OrderId::new("order-1"))]);
        let emitted = pusher.emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, RoomId::Order(OrderId::new("order-1")));
    }

    #[tokio::test]
    async fn test_admin_message_also_targets_owner_room() {
        // given: an admin replies while the owner has not joined the
        // order room yet
        let pusher = Arc::new(RecordingPusher::default());
        let router = RoomRouter::new(pusher.clone());
        let message = test_message("carol");

        // when:
        let targeted = router
            .route_message(&message, true, &UserId::new("alice"))
            .await
            .unwrap();

        // then:
        assert_eq!(
            targeted,
            vec![
                RoomId::Order(OrderId::new("order-1")),
                RoomId::User(UserId::new("alice")),
            ]
        );
    }

    #[tokio::test]
    async fn test_collective_notification_emitted_once_to_admin_room() {
        // given:
        let pusher = Arc::new(RecordingPusher::default());
        let router = RoomRouter::new(pusher.clone());
        let notification = Notification {
            id: "ntf-1".to_string(),
            kind: NotificationKind::PaymentReceived,
            target: NotificationTarget::AdminCollective,
            payload: serde_json::json!({ "order_id": "order-1" }),
            read: false,
            created_at: 1000,
        };

        // when:
        let room = router.route_notification(&notification).await.unwrap();

        // then: exactly one emission, to the admin room
        assert_eq!(room, RoomId::Admin);
        let emitted = pusher.emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, RoomId::Admin);
    }

    #[tokio::test]
    async fn test_user_notification_targets_personal_room() {
        // given:
        let pusher = Arc::new(RecordingPusher::default());
        let router = RoomRouter::new(pusher.clone());
        let notification = Notification {
            id: "ntf-2".to_string(),
            kind: NotificationKind::StatusUpdated,
            target: NotificationTarget::User {
                user_id: UserId::new("alice"),
            },
            payload: serde_json::json!({ "status": "in_progress" }),
            read: false,
            created_at: 1000,
        };

        // when:
        let room = router.route_notification(&notification).await.unwrap();

        // then:
        assert_eq!(room, RoomId::User(UserId::new("alice")));
    }
}
