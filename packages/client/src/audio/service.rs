//! Process-wide audio service with explicit lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::worker::{AudioWorker, WorkerCommand};
use crate::notify::DedupMemo;

/// A second play of the same sound key within this window is dropped.
pub const SOUND_COOLDOWN: Duration = Duration::from_secs(3);

const SOUND_MEMO_CAPACITY: usize = 32;

/// Owns the worker and the playback policy: no sound before the first
/// user gesture, no duplicate sound within the cooldown window.
pub struct AudioService {
    armed: AtomicBool,
    memo: Mutex<DedupMemo>,
    worker: AudioWorker,
}

impl AudioService {
    pub fn init() -> Self {
        Self {
            armed: AtomicBool::new(false),
            memo: Mutex::new(DedupMemo::new(SOUND_COOLDOWN, SOUND_MEMO_CAPACITY)),
            worker: AudioWorker::spawn(),
        }
    }

    /// Record that a user gesture was observed. Until then, playback
    /// attempts are best-effort no-ops.
    pub fn arm(&self) {
        if !self.armed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Audio armed by first user gesture");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Relaxed)
    }

    /// Request the notification cue for `sound_key`. Returns whether a
    /// play was actually posted; a gated or deduplicated attempt is a
    /// silent no-op, never an error.
    pub fn play(&self, sound_key: &str) -> bool {
        if !self.is_armed() {
            tracing::debug!("Audio not armed yet, skipping '{}'", sound_key);
            return false;
        }

        let fresh = match self.memo.lock() {
            Ok(mut memo) => memo.observe(sound_key, Instant::now()),
            Err(_) => false,
        };
        if !fresh {
            return false;
        }

        self.worker
            .post(WorkerCommand::PlayNotificationSound)
            .is_ok()
    }

    /// Delegate an OS-level notification to the worker.
    pub fn request_background_notification(&self, title: &str, body: &str, tag: &str) {
        let posted = self.worker.post(WorkerCommand::ShowBackgroundNotification {
            title: title.to_string(),
            body: body.to_string(),
            tag: tag.to_string(),
        });
        if posted.is_err() {
            tracing::debug!("Audio worker gone, dropping background notification");
        }
    }

    /// Stop the worker. Equivalent to dropping the service; explicit
    /// for call sites that want the teardown visible.
    pub fn teardown(self) {}
}
