//! Background worker owning the sound backends.
//!
//! The session only posts commands; the worker decides how to fulfil
//! them. This keeps the (not necessarily `Send`) backends confined to
//! one thread and keeps playback off the async runtime.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use super::backend::{Cue, SoundBackend, TerminalBellBackend, FALLBACK_CUE, PRIMARY_CUE};
use super::AudioError;
use crate::notify::DedupMemo;

/// Tag-identical background notifications within this window collapse,
/// mirroring OS tag-replacement semantics.
const TAG_WINDOW: Duration = Duration::from_secs(3);

/// Instruction set accepted by the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    PlayNotificationSound,
    ShowBackgroundNotification {
        title: String,
        body: String,
        tag: String,
    },
    Shutdown,
}

/// Handle to the worker thread. Dropping it shuts the worker down.
pub struct AudioWorker {
    tx: mpsc::Sender<WorkerCommand>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AudioWorker {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || worker_loop(rx));
        Self {
            tx,
            handle: Some(handle),
        }
    }

    pub fn post(&self, command: WorkerCommand) -> Result<(), AudioError> {
        self.tx.send(command).map_err(|_| AudioError::WorkerStopped)
    }
}

impl Drop for AudioWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(rx: mpsc::Receiver<WorkerCommand>) {
    let mut backends = backend_chain();
    let mut tag_memo = DedupMemo::new(TAG_WINDOW, 32);

    while let Ok(command) = rx.recv() {
        match command {
            WorkerCommand::PlayNotificationSound => {
                if let Err(e) = play_with_fallback(&mut backends) {
                    tracing::debug!("Every sound backend failed: {}", e);
                }
            }
            WorkerCommand::ShowBackgroundNotification { title, body, tag } => {
                if !tag_memo.observe(&tag, Instant::now()) {
                    continue;
                }
                show_terminal_notification(&title, &body);
            }
            WorkerCommand::Shutdown => break,
        }
    }
}

fn backend_chain() -> Vec<Box<dyn SoundBackend>> {
    #[allow(unused_mut)]
    let mut chain: Vec<Box<dyn SoundBackend>> = vec![Box::new(TerminalBellBackend)];
    #[cfg(feature = "device-audio")]
    chain.push(Box::new(super::backend::CpalToneBackend::new()));
    chain
}

/// Walk the backend chain with the primary cue, then once more with
/// the alternate cue. Stops at the first success.
fn play_with_fallback(backends: &mut [Box<dyn SoundBackend>]) -> Result<(), AudioError> {
    let mut last_error = AudioError::NoOutputDevice;
    for cue in [&PRIMARY_CUE, &FALLBACK_CUE] {
        for backend in backends.iter_mut() {
            match backend.play(cue) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!("Backend '{}' failed: {}", backend.name(), e);
                    last_error = e;
                }
            }
        }
    }
    Err(last_error)
}

/// OSC 9 escape: terminals that support it raise a desktop
/// notification, others ignore the sequence.
fn show_terminal_notification(title: &str, body: &str) {
    use std::io::Write;

    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\x1b]9;{}: {}\x07", title, body);
    let _ = stdout.flush();
}
