//! Notification delivery coordination.
//!
//! Decides, per inbound notification, which delivery channels fire
//! (inline toast, background desktop notification, audio cue), keeps
//! the unread counter, and suppresses redundant alerts for one logical
//! event arriving over several transport paths.

pub mod badge;
pub mod coordinator;
pub mod memo;

pub use badge::TitleBadge;
pub use coordinator::{decide_channels, Channel, Coordinator, Delivery, Permission, Visibility};
pub use memo::DedupMemo;
