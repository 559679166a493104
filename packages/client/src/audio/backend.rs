//! Sound backends.
//!
//! Backends live on the worker thread; none of them needs to be
//! `Send`. The terminal bell is always available, the device tone only
//! with the `device-audio` feature.

use std::io::Write;

use super::AudioError;

/// A short synthesized tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub frequency_hz: f32,
    pub duration_ms: u64,
}

/// Cue attempted first for every notification sound.
pub const PRIMARY_CUE: Cue = Cue {
    frequency_hz: 880.0,
    duration_ms: 150,
};

/// Alternate cue attempted when the whole chain failed on the primary.
pub const FALLBACK_CUE: Cue = Cue {
    frequency_hz: 660.0,
    duration_ms: 200,
};

/// One way of making a sound.
pub trait SoundBackend {
    fn name(&self) -> &'static str;

    fn play(&mut self, cue: &Cue) -> Result<(), AudioError>;
}

/// ASCII BEL to stdout. Frequency and duration are up to the terminal.
pub struct TerminalBellBackend;

impl SoundBackend for TerminalBellBackend {
    fn name(&self) -> &'static str {
        "terminal-bell"
    }

    fn play(&mut self, _cue: &Cue) -> Result<(), AudioError> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| AudioError::Terminal(e.to_string()))
    }
}

const TONE_AMPLITUDE: f32 = 0.2;

/// Phase-accumulating sine source shared with the output callback.
///
/// Retuning restarts the phase at zero so every cue begins at a zero
/// crossing instead of an audible click.
pub struct ToneWave {
    sample_rate: f32,
    step: f32,
    phase: f32,
}

impl ToneWave {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            step: 0.0,
            phase: 0.0,
        }
    }

    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.step = frequency_hz * 2.0 * std::f32::consts::PI / self.sample_rate;
        self.phase = 0.0;
    }

    pub fn next_sample(&mut self) -> f32 {
        let sample = self.phase.sin() * TONE_AMPLITUDE;
        self.phase += self.step;
        if self.phase > 2.0 * std::f32::consts::PI {
            self.phase -= 2.0 * std::f32::consts::PI;
        }
        sample
    }
}

/// Sine tone through the default output device via cpal.
///
/// The stream is opened once on the first cue and kept; later cues
/// retune the shared [`ToneWave`] and resume/pause the retained
/// handle. Only a device or stream failure discards the handle, so
/// the next cue reopens the device.
#[cfg(feature = "device-audio")]
pub struct CpalToneBackend {
    output: Option<ToneOutput>,
}

#[cfg(feature = "device-audio")]
struct ToneOutput {
    stream: cpal::Stream,
    wave: std::sync::Arc<std::sync::Mutex<ToneWave>>,
}

#[cfg(feature = "device-audio")]
impl CpalToneBackend {
    pub fn new() -> Self {
        Self { output: None }
    }

    fn open_output() -> Result<ToneOutput, AudioError> {
        use cpal::traits::{DeviceTrait, HostTrait};

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Device(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();

        let config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let wave = std::sync::Arc::new(std::sync::Mutex::new(ToneWave::new(sample_rate as f32)));
        let callback_wave = wave.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    let mut wave = match callback_wave.lock() {
                        Ok(wave) => wave,
                        Err(_) => return,
                    };
                    for frame in data.chunks_mut(channels as usize) {
                        let sample = wave.next_sample();
                        for slot in frame.iter_mut() {
                            *slot = sample;
                        }
                    }
                },
                move |err| {
                    tracing::warn!("Audio output error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        Ok(ToneOutput { stream, wave })
    }

    fn drive(output: &ToneOutput, cue: &Cue) -> Result<(), AudioError> {
        use cpal::traits::StreamTrait;

        output
            .wave
            .lock()
            .map_err(|_| AudioError::Stream("tone state poisoned".to_string()))?
            .set_frequency(cue.frequency_hz);

        output
            .stream
            .play()
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        // Runs on the worker thread, so blocking for the cue is fine.
        std::thread::sleep(std::time::Duration::from_millis(cue.duration_ms));

        output
            .stream
            .pause()
            .map_err(|e| AudioError::Stream(e.to_string()))
    }
}

#[cfg(feature = "device-audio")]
impl SoundBackend for CpalToneBackend {
    fn name(&self) -> &'static str {
        "cpal-tone"
    }

    fn play(&mut self, cue: &Cue) -> Result<(), AudioError> {
        if self.output.is_none() {
            self.output = Some(Self::open_output()?);
        }

        let result = match self.output.as_ref() {
            Some(output) => Self::drive(output, cue),
            None => Err(AudioError::NoOutputDevice),
        };

        if result.is_err() {
            // A dead stream stays dead; reopen on the next cue.
            self.output = None;
        }
        result
    }
}
