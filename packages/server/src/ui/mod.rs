//! HTTP/WebSocket surface of the gateway.

pub mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
