//! Concrete implementations of the domain-layer interfaces.

pub mod pusher;
pub mod store;
