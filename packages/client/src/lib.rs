//! CLI client for the Renraku gateway.
//!
//! The client keeps a locally reconciled view of one order's
//! conversation ([`reconcile::OrderTimeline`]), decides how incoming
//! notifications reach the operator ([`notify`]), and plays an
//! attention cue through the terminal or the audio device ([`audio`]).

pub mod audio;
pub mod error;
pub mod formatter;
pub mod notify;
pub mod reconcile;
pub mod runner;
pub mod session;
pub mod ui;
