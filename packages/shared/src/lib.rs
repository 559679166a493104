//! Shared building blocks for the Renraku chat and notification core.
//!
//! This crate holds everything the server and client must agree on:
//! the wire protocol, the message/notification data model, room
//! identifiers, the clock abstraction, and logging setup.

pub mod logger;
pub mod protocol;
pub mod time;
pub mod types;
