//! Renraku gateway server.
//!
//! Accepts bidirectional WebSocket connections, resolves each one to an
//! identity (optionally anonymous), indexes connections into logical
//! rooms, and fans persisted chat/notification events out to the rooms
//! that should receive them.

// layers
pub mod auth;
pub mod domain;
pub mod infrastructure;
pub mod router;
pub mod ui;
pub mod usecase;
