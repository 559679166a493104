//! `RoomPusher` implementations.
//!
//! - `websocket`: fan-out over the per-connection WebSocket channels.

pub mod websocket;

pub use websocket::WebSocketRoomPusher;
