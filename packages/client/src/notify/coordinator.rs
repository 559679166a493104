//! Channel decision and duplicate suppression for inbound alerts.

use std::time::{Duration, Instant};

use renraku_shared::types::{Message, Notification, NotificationKind};

use super::memo::DedupMemo;

/// Alerts for one logical event arriving twice (live push plus a
/// redundant poll) within this window collapse into one delivery.
pub const DEDUP_COOLDOWN: Duration = Duration::from_secs(3);

const DEDUP_CAPACITY: usize = 64;

/// Whether the operator is looking at the terminal right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Foreground,
    Background,
}

/// Whether OS-level desktop notifications are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// A concrete way of alerting the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Print into the running conversation view.
    InlineToast,
    /// OS-level notification, delegated to the background worker.
    BackgroundNotification,
    /// Short attention cue via the audio subsystem.
    Audio,
}

/// The channel decision table.
///
/// Audio is always attempted; whether it actually sounds is the audio
/// subsystem's concern (gesture gating, its own cooldown). Visibility
/// alone never suppresses the cue.
pub fn decide_channels(visibility: Visibility, permission: Permission) -> &'static [Channel] {
    match (visibility, permission) {
        (Visibility::Foreground, _) => &[Channel::InlineToast, Channel::Audio],
        (Visibility::Background, Permission::Granted) => {
            &[Channel::BackgroundNotification, Channel::Audio]
        }
        (Visibility::Background, Permission::Denied) => &[Channel::Audio],
    }
}

/// One accepted alert, ready for the session to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channels: &'static [Channel],
    pub title: String,
    pub body: String,
    /// Stable per logical notification so the OS replaces rather than
    /// stacks duplicates of the same event.
    pub tag: String,
}

/// Decides delivery for each inbound alert and keeps the notification
/// unread counter.
pub struct Coordinator {
    permission: Permission,
    memo: DedupMemo,
    unread_notifications: usize,
}

impl Coordinator {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            memo: DedupMemo::new(DEDUP_COOLDOWN, DEDUP_CAPACITY),
            unread_notifications: 0,
        }
    }

    pub fn unread_notifications(&self) -> usize {
        self.unread_notifications
    }

    pub fn mark_notifications_read(&mut self) {
        self.unread_notifications = 0;
    }

    /// Decide delivery for a notification record. Returns `None` when
    /// the event's composite identity was already processed within the
    /// cooldown window.
    pub fn on_notification(
        &mut self,
        notification: &Notification,
        visibility: Visibility,
        now: Instant,
    ) -> Option<Delivery> {
        let order_ref = notification
            .payload
            .get("order_id")
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string();
        let key = format!(
            "{}:{}:{}",
            kind_label(notification.kind),
            order_ref,
            notification.created_at
        );
        if !self.memo.observe(&key, now) {
            return None;
        }

        self.unread_notifications += 1;

        Some(Delivery {
            channels: decide_channels(visibility, self.permission),
            title: kind_title(notification.kind).to_string(),
            body: format!("order {}", order_ref),
            tag: format!("{}:{}", kind_label(notification.kind), order_ref),
        })
    }

    /// Decide delivery for a chat message pushed into the order room.
    pub fn on_message(
        &mut self,
        message: &Message,
        visibility: Visibility,
        now: Instant,
    ) -> Option<Delivery> {
        let key = format!("message:{}", message.id);
        if !self.memo.observe(&key, now) {
            return None;
        }

        Some(Delivery {
            channels: decide_channels(visibility, self.permission),
            title: format!("New message from {}", message.sender_id),
            body: message.body.clone(),
            tag: format!("message:{}", message.order_id),
        })
    }
}

fn kind_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::OrderConfirmed => "order_confirmed",
        NotificationKind::PaymentReceived => "payment_received",
        NotificationKind::StatusUpdated => "status_updated",
        NotificationKind::MessageReceived => "message_received",
    }
}

fn kind_title(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::OrderConfirmed => "Order confirmed",
        NotificationKind::PaymentReceived => "Payment received",
        NotificationKind::StatusUpdated => "Order status updated",
        NotificationKind::MessageReceived => "New message",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renraku_shared::types::NotificationTarget;

    fn notification(created_at: i64) -> Notification {
        Notification {
            id: "ntf-1".to_string(),
            kind: NotificationKind::MessageReceived,
            target: NotificationTarget::AdminCollective,
            payload: serde_json::json!({ "order_id": "order-1" }),
            read: false,
            created_at,
        }
    }

    #[test]
    fn test_foreground_gets_toast_and_audio() {
        // given / when:
        let channels = decide_channels(Visibility::Foreground, Permission::Denied);

        // then:
        assert_eq!(channels, &[Channel::InlineToast, Channel::Audio]);
    }

    #[test]
    fn test_background_with_permission_gets_desktop_notification_and_audio() {
        // given: terminal backgrounded, permission granted
        let mut coordinator = Coordinator::new(Permission::Granted);

        // when: a message_received event arrives
        let delivery = coordinator
            .on_notification(&notification(1000), Visibility::Background, Instant::now())
            .unwrap();

        // then: the background channel fires and audio is still attempted
        assert!(delivery.channels.contains(&Channel::BackgroundNotification));
        assert!(delivery.channels.contains(&Channel::Audio));
        assert!(!delivery.channels.contains(&Channel::InlineToast));
    }

    #[test]
    fn test_background_without_permission_only_attempts_audio() {
        // given / when:
        let channels = decide_channels(Visibility::Background, Permission::Denied);

        // then:
        assert_eq!(channels, &[Channel::Audio]);
    }

    #[test]
    fn test_same_event_within_cooldown_delivers_once() {
        // given:
        let mut coordinator = Coordinator::new(Permission::Granted);
        let now = Instant::now();
        let event = notification(1000);

        // when: identical composite identity arrives twice
        let first = coordinator.on_notification(&event, Visibility::Foreground, now);
        let second =
            coordinator.on_notification(&event, Visibility::Foreground, now + Duration::from_millis(200));

        // then:
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(coordinator.unread_notifications(), 1);
    }

    #[test]
    fn test_distinct_timestamps_are_distinct_events() {
        // given:
        let mut coordinator = Coordinator::new(Permission::Granted);
        let now = Instant::now();

        // when: same kind and order, different creation time
        let first = coordinator.on_notification(&notification(1000), Visibility::Foreground, now);
        let second = coordinator.on_notification(&notification(2000), Visibility::Foreground, now);

        // then:
        assert!(first.is_some());
        assert!(second.is_some());
        assert_eq!(coordinator.unread_notifications(), 2);
    }

    #[test]
    fn test_notification_tag_is_stable_per_logical_event() {
        // given: the same logical event observed at two times
        let mut coordinator = Coordinator::new(Permission::Granted);
        let now = Instant::now();

        // when:
        let first = coordinator
            .on_notification(&notification(1000), Visibility::Background, now)
            .unwrap();
        let second = coordinator
            .on_notification(&notification(2000), Visibility::Background, now)
            .unwrap();

        // then: tags match so the OS replaces instead of stacking
        assert_eq!(first.tag, second.tag);
        assert_eq!(first.tag, "message_received:order-1");
    }

    #[test]
    fn test_mark_notifications_read_resets_counter() {
        // given:
        let mut coordinator = Coordinator::new(Permission::Denied);
        coordinator.on_notification(&notification(1000), Visibility::Foreground, Instant::now());

        // when:
        coordinator.mark_notifications_read();

        // then:
        assert_eq!(coordinator.unread_notifications(), 0);
    }
}
