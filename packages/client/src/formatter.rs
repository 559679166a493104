//! Display formatting for the conversation view.

use renraku_shared::time::millis_to_rfc3339;
use renraku_shared::types::{Identity, Message, MessageKind, Notification, OrderId, UserId};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the snapshot shown after joining an order room.
    pub fn format_snapshot(order_id: &OrderId, messages: &[Message], me: Option<&UserId>) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str(&format!("Conversation for order '{}':\n", order_id));

        if messages.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for message in messages {
                output.push_str(&Self::format_line(message, me));
                output.push('\n');
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format one message as a single conversation line.
    pub fn format_line(message: &Message, me: Option<&UserId>) -> String {
        let me_suffix = if Some(&message.sender_id) == me {
            " (me)"
        } else {
            ""
        };
        let pending = if message.is_temporary() {
            " [sending...]"
        } else {
            ""
        };
        let kind = match message.kind {
            MessageKind::Text => "",
            MessageKind::Image => "[image] ",
            MessageKind::System => "[system] ",
        };
        format!(
            "@{}{}: {}{}{} ({})",
            message.sender_id,
            me_suffix,
            kind,
            message.body,
            pending,
            millis_to_rfc3339(message.created_at)
        )
    }

    /// Format an incoming message pushed into the room.
    pub fn format_incoming(message: &Message, me: Option<&UserId>) -> String {
        format!("\n{}\n", Self::format_line(message, me))
    }

    /// Format the confirmation printed once the server acknowledged a send.
    pub fn format_ack(message: &Message) -> String {
        format!("delivered at {}\n", millis_to_rfc3339(message.created_at))
    }

    /// Format a notification toast.
    pub fn format_notification(notification: &Notification) -> String {
        let order_ref = notification
            .payload
            .get("order_id")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        format!(
            "\n* {:?} for order {} at {}\n",
            notification.kind,
            order_ref,
            millis_to_rfc3339(notification.created_at)
        )
    }

    /// Format an order lifecycle change.
    pub fn format_status_update(order_id: &OrderId, status: &str) -> String {
        format!("\n* Order '{}' is now '{}'\n", order_id, status)
    }

    /// Format a read receipt observed from another connection.
    pub fn format_read_receipt(order_id: &OrderId, reader_id: &UserId) -> String {
        format!("\n* '{}' read the conversation of '{}'\n", reader_id, order_id)
    }

    /// Format the identity banner shown after the handshake.
    pub fn format_connected(identity: &Identity) -> String {
        match identity {
            Identity::Anonymous => {
                "\nConnected anonymously; general notifications only.\n".to_string()
            }
            Identity::User { user_id, role } => {
                format!("\nConnected as '{}' ({:?}).\n", user_id, role)
            }
        }
    }

    /// Format a typed server error.
    pub fn format_error(detail: &str) -> String {
        format!("\n! {}\n", detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renraku_shared::types::{NotificationKind, NotificationTarget, Role};

    fn message(id: &str, sender: &str, body: &str) -> Message {
        Message {
            id: id.to_string(),
            order_id: OrderId::new("order-1"),
            sender_id: UserId::new(sender),
            body: body.to_string(),
            kind: MessageKind::Text,
            delivered: true,
            read: false,
            created_at: 1672498800000,
        }
    }

    #[test]
    fn test_format_snapshot_with_no_messages() {
        // given:
        let order_id = OrderId::new("order-1");

        // when:
        let result = MessageFormatter::format_snapshot(&order_id, &[], None);

        // then:
        assert!(result.contains("Conversation for order 'order-1'"));
        assert!(result.contains("(No messages yet)"));
    }

    #[test]
    fn test_format_line_marks_own_messages() {
        // given:
        let own = message("msg-1", "alice", "hello");
        let me = UserId::new("alice");

        // when:
        let result = MessageFormatter::format_line(&own, Some(&me));

        // then:
        assert!(result.contains("@alice (me): hello"));
        assert!(result.contains("2023-01-01"));
    }

    #[test]
    fn test_format_line_marks_pending_optimistic_entries() {
        // given:
        let pending = message("tmp-1", "alice", "hello");

        // when:
        let result = MessageFormatter::format_line(&pending, None);

        // then:
        assert!(result.contains("[sending...]"));
    }

    #[test]
    fn test_format_line_labels_image_messages() {
        // given:
        let mut image = message("msg-1", "carol", "https://cdn.example/shot.png");
        image.kind = MessageKind::Image;

        // when:
        let result = MessageFormatter::format_line(&image, None);

        // then:
        assert!(result.contains("[image]"));
        assert!(result.contains("https://cdn.example/shot.png"));
    }

    #[test]
    fn test_format_notification_reads_order_from_payload() {
        // given:
        let notification = Notification {
            id: "ntf-1".to_string(),
            kind: NotificationKind::PaymentReceived,
            target: NotificationTarget::AdminCollective,
            payload: serde_json::json!({ "order_id": "order-9" }),
            read: false,
            created_at: 1672498800000,
        };

        // when:
        let result = MessageFormatter::format_notification(&notification);

        // then:
        assert!(result.contains("PaymentReceived"));
        assert!(result.contains("order-9"));
    }

    #[test]
    fn test_format_connected_banner() {
        // given:
        let identity = Identity::User {
            user_id: UserId::new("alice"),
            role: Role::Customer,
        };

        // when / then:
        assert!(MessageFormatter::format_connected(&identity).contains("Connected as 'alice'"));
        assert!(
            MessageFormatter::format_connected(&Identity::Anonymous).contains("anonymously")
        );
    }

    #[test]
    fn test_format_status_update() {
        // given / when:
        let result =
            MessageFormatter::format_status_update(&OrderId::new("order-1"), "completed");

        // then:
        assert!(result.contains("order-1"));
        assert!(result.contains("completed"));
    }
}
