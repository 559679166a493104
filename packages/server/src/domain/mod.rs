//! Server-side domain layer.
//!
//! Defines the interfaces the gateway needs from the outside world
//! (persistent store, live push transport) and the pure authorization
//! logic that decides who may enter which room. Concrete
//! implementations live in the infrastructure layer (dependency
//! inversion, as with any repository/pusher split).

mod connection;
mod error;
mod logic;
mod pusher;
mod store;

#[cfg(test)]
pub mod test_support;

pub use connection::ConnectionId;
pub use error::{MessagePushError, RepositoryError};
pub use logic::{can_join_order, initial_rooms};
pub use pusher::{PusherChannel, RoomPusher};
pub use store::MessageStore;

#[cfg(test)]
pub use store::MockMessageStore;
