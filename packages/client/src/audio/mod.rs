//! Audio/attention subsystem.
//!
//! Plays a short cue for chat and notification events. Playback is
//! gated behind the first observed user gesture, deduplicated within a
//! cooldown window, and executed on a dedicated worker thread that
//! owns the sound backends (terminal bell first, synthesized device
//! tone as fallback when the `device-audio` feature is enabled).

pub mod backend;
pub mod service;
pub mod worker;

use thiserror::Error;

pub use backend::{Cue, SoundBackend, TerminalBellBackend, FALLBACK_CUE, PRIMARY_CUE};
pub use service::AudioService;
pub use worker::{AudioWorker, WorkerCommand};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No output device available")]
    NoOutputDevice,

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Terminal write error: {0}")]
    Terminal(String),

    #[error("Audio worker is not running")]
    WorkerStopped,
}
