//! Wire protocol between the gateway and its clients.
//!
//! Every frame is a JSON object carrying a `type` tag. The enums below
//! are the single source of truth for both sides; the server never
//! hand-assembles frames and the client never pattern-matches raw JSON.

use serde::{Deserialize, Serialize};

use crate::types::{Identity, Message, MessageKind, Notification, OrderId, UserId};

/// Events sent from a client to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Request membership of an order's conversation room.
    JoinOrderRoom { order_id: OrderId },
    /// Drop membership of an order's conversation room.
    LeaveOrderRoom { order_id: OrderId },
    /// Send a chat message. `temp_id` is the client-side optimistic id,
    /// echoed back in the acknowledgment so the sender can reconcile.
    SendMessage {
        order_id: OrderId,
        body: String,
        kind: MessageKind,
        temp_id: String,
    },
    /// Mark every message of the order as read by this connection's user.
    MarkMessagesRead { order_id: OrderId },
    /// Liveness probe.
    Ping,
}

/// Kind of a typed error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireErrorKind {
    /// The caller has no rights to the referenced order or action.
    Authorization,
    /// The referenced order or message does not exist.
    NotFound,
    /// The frame could not be understood.
    Transport,
    /// The persistent store misbehaved; the operation degraded.
    Store,
}

/// Events sent from the gateway to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Handshake result: the identity the gateway resolved for this
    /// connection (possibly downgraded to anonymous).
    Connected { identity: Identity },
    /// Initial history pushed on a successful order-room join.
    RoomSnapshot {
        order_id: OrderId,
        messages: Vec<Message>,
    },
    /// A newly persisted message, fanned out to the order room.
    NewMessage { message: Message },
    /// Acknowledgment of the sender's own message; carries the
    /// authoritative record that supersedes the optimistic entry.
    MessageAck { temp_id: String, message: Message },
    /// Read-state change, echoed so every connection of the same user
    /// (and the other party) observes it.
    MessagesMarkedRead { order_id: OrderId, reader_id: UserId },
    /// A newly created notification record.
    NewNotification { notification: Notification },
    /// Order lifecycle change pushed to the conversation.
    OrderStatusUpdated { order_id: OrderId, status: String },
    /// Liveness probe answer.
    Pong,
    /// Typed failure. `temp_id` is set when the failure concerns an
    /// optimistic send, so the client can drop the placeholder.
    Error {
        kind: WireErrorKind,
        detail: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        temp_id: Option<String>,
    },
}
