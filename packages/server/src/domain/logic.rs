//! Pure authorization and room-placement logic.
//!
//! These functions have no side effects, which keeps the gateway's
//! access rules easy to test in isolation.

use renraku_shared::types::{Identity, RoomId, UserId};

/// Rooms a connection joins automatically during the handshake.
///
/// Authenticated users get their personal room; admins additionally
/// get the role-wide `admin` room; anonymous connections are placed in
/// `general` so broadcast announcements still reach them.
pub fn initial_rooms(identity: &Identity) -> Vec<RoomId> {
    match identity {
        Identity::Anonymous => vec![RoomId::General],
        Identity::User { user_id, .. } => {
            let mut rooms = vec![RoomId::User(user_id.clone())];
            if identity.is_admin() {
                rooms.push(RoomId::Admin);
            }
            rooms
        }
    }
}

/// Whether `identity` may join (or read/write) the conversation of an
/// order owned by `owner`.
///
/// Only the order's owner and admins qualify; anonymous connections
/// never do.
pub fn can_join_order(identity: &Identity, owner: &UserId) -> bool {
    if identity.is_admin() {
        return true;
    }
    match identity.user_id() {
        Some(user_id) => user_id == owner,
        None => false,
    }
}
