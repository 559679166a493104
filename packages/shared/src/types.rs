//! Domain data model shared between server and client.
//!
//! These types are the vocabulary of the whole system: identities and
//! roles, room identifiers, chat messages, and notification records.
//! The server persists and routes them; the client reconciles them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix carried by client-generated optimistic message ids.
///
/// Temporary ids are never persisted; the reconciliation engine drops
/// them as soon as the authoritative counterpart arrives.
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// Identifier of a platform user (customer or admin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an order (one order owns one chat conversation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role attached to an authenticated connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
}

/// Identity resolved during the connection handshake.
///
/// A missing or invalid token downgrades to `Anonymous` instead of
/// rejecting the connection; anonymous connections only ever see the
/// general broadcast room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Anonymous,
    User { user_id: UserId, role: Role },
}

impl Identity {
    /// User id, if the connection is authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::User { user_id, .. } => Some(user_id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Identity::User {
                role: Role::Admin,
                ..
            }
        )
    }
}

/// A logical broadcast group held by the gateway.
///
/// Rooms have no persistence of their own; they exist only as the
/// current membership index. The enum makes the four room kinds
/// structurally distinct rather than string-convention distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// Personal room of one authenticated user (`user:<id>`).
    User(UserId),
    /// Per-conversation room of one order (`order:<id>`).
    Order(OrderId),
    /// Role-wide broadcast room for all admins (`admin`).
    Admin,
    /// Room for unauthenticated connections (`general`).
    General,
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::User(id) => write!(f, "user:{}", id),
            RoomId::Order(id) => write!(f, "order:{}", id),
            RoomId::Admin => f.write_str("admin"),
            RoomId::General => f.write_str("general"),
        }
    }
}

/// Kind of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    System,
}

/// One chat utterance.
///
/// Exactly one authoritative copy exists per server-assigned id.
/// Client-side optimistic entries use a `tmp-` prefixed id and never
/// reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub order_id: OrderId,
    pub sender_id: UserId,
    pub body: String,
    pub kind: MessageKind,
    pub delivered: bool,
    pub read: bool,
    /// Creation time, Unix milliseconds (UTC).
    pub created_at: i64,
}

impl Message {
    /// Whether this entry is an optimistic client-side placeholder.
    pub fn is_temporary(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
    }
}

/// Enumerated notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderConfirmed,
    PaymentReceived,
    StatusUpdated,
    MessageReceived,
}

/// Target of a notification.
///
/// The tagged variant makes the single-record invariant structural:
/// a collective admin notification is one record referenced by every
/// admin, never one record per admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum NotificationTarget {
    User { user_id: UserId },
    AdminCollective,
}

/// An event meant for a human.
///
/// Created when a triggering event occurs, mutated only by the
/// read-flag transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub target: NotificationTarget,
    /// Free-form event data supplied by the triggering collaborator.
    pub payload: serde_json::Value,
    pub read: bool,
    /// Creation time, Unix milliseconds (UTC).
    pub created_at: i64,
}
