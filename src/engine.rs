//! # Echo Engine
//!
//! The engine owns the delay history and runs the per-sample loop. It
//! knows nothing about plugin formats: the host-facing shell in `lib.rs`
//! translates host callbacks into three calls:
//!
//! - [`EchoEngine::prepare`]: allocate and zero the delay line for a
//!   sample rate and channel count. Always a hard reset.
//! - [`EchoEngine::process`]: run one block in place, using one
//!   [`ParamSnapshot`] for the whole block.
//! - [`EchoEngine::release`]: drop the buffers.
//!
//! ## Lifecycle
//!
//! ```text
//!                 prepare(ok)                 release()
//! Uninitialized ─────────────► Prepared ──────────────────► Released
//!       ▲                       │    ▲                          │
//!       │   prepare(err)        │    │ prepare(ok)              │
//!       └───────────────────────┘    └──────────────────────────┘
//! ```
//!
//! Only a prepared engine touches audio. In every other state `process`
//! leaves the buffers untouched, so a bad configuration degrades to a
//! passthrough instead of silence or a crash.
//!
//! ## Per-Sample Algorithm
//!
//! ```text
//! dry ──► [rotate] ──► × gain ──► input ──────────────────────┐
//!  │                                                          ▼
//!  │       [delay line] ──► delayed ──► [ping-pong] ──► wet ─►(+ × feedback)──► write
//!  │                                                     │
//!  └──────── × dry ───────────────────────────────────►(+)◄── × wet
//!                                                        │
//!                                                        ▼
//!                                                      output
//! ```
//!
//! Every read of the delay line for a sample happens before any write
//! for that sample, and the shared cursor advances once after both
//! channels are done. That makes in-place processing safe.

use std::num::NonZeroUsize;

use nih_plug::{nih_debug_assert, nih_log, nih_warn};
use thiserror::Error;

use crate::dsp::delay_line::{DelayLine, MAX_CHANNELS};
use crate::dsp::pingpong::FeedbackMixer;
use crate::dsp::rotator::StereoRotator;
use crate::dsp::{flush_denormal, flush_non_finite, StereoFrame};
use crate::params::ParamSnapshot;

/// Highest sample rate the engine accepts. One second of history at this
/// rate is about 12 MB for two channels.
pub const MAX_SAMPLE_RATE: f32 = 1_536_000.0;

/// Longest echo the delay line can hold.
pub const MAX_DELAY_SECONDS: f64 = 1.0;

/// Below -60 dB an echo is considered inaudible.
const TAIL_FLOOR_LOG10: f32 = -3.0;

/// Audio configuration negotiated with the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz, in `(0, MAX_SAMPLE_RATE]`.
    pub sample_rate: f32,
    /// Largest block the host will deliver. Informational only.
    pub max_block_size: usize,
    /// 1 (mono) or 2 (stereo).
    pub channels: usize,
}

impl EngineConfig {
    pub fn new(sample_rate: f32, max_block_size: usize, channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channels,
        }
    }

    pub fn validate(&self) -> Result<(), PrepareError> {
        if !(self.sample_rate > 0.0 && self.sample_rate <= MAX_SAMPLE_RATE) {
            return Err(PrepareError::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(PrepareError::UnsupportedChannelCount(self.channels));
        }
        Ok(())
    }

    /// Samples per channel needed for [`MAX_DELAY_SECONDS`] of history:
    /// `ceil(sample_rate * 1 s)`.
    pub fn delay_capacity(&self) -> usize {
        (f64::from(self.sample_rate) * MAX_DELAY_SECONDS).ceil() as usize
    }
}

/// Why a configuration was refused by [`EchoEngine::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PrepareError {
    #[error("invalid sample rate {0} Hz, must be above 0 and at most 1536000 Hz")]
    InvalidSampleRate(f32),
    #[error("unsupported channel count {0}, only mono and stereo are supported")]
    UnsupportedChannelCount(usize),
}

/// Observable lifecycle state of an [`EchoEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Uninitialized,
    Prepared,
    Released,
}

/// State that only exists between a successful prepare and a release.
struct EngineState {
    config: EngineConfig,
    delay_line: DelayLine,
}

enum Lifecycle {
    Uninitialized,
    Prepared(EngineState),
    Released,
}

/// The stereo echo.
///
/// All configuration arrives through [`EngineConfig`] and
/// [`ParamSnapshot`]; the engine holds no global state.
pub struct EchoEngine {
    lifecycle: Lifecycle,
}

impl Default for EchoEngine {
    fn default() -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
        }
    }
}

impl EchoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> EngineStatus {
        match self.lifecycle {
            Lifecycle::Uninitialized => EngineStatus::Uninitialized,
            Lifecycle::Prepared(_) => EngineStatus::Prepared,
            Lifecycle::Released => EngineStatus::Released,
        }
    }

    /// Delay line length in samples per channel, if prepared.
    pub fn delay_capacity(&self) -> Option<usize> {
        match &self.lifecycle {
            Lifecycle::Prepared(state) => Some(state.delay_line.capacity()),
            _ => None,
        }
    }

    /// Allocate a fresh, zero-filled delay line for `config`.
    ///
    /// Any previous history is discarded, even when the configuration
    /// has not changed. On error the engine is left uninitialized and
    /// passes audio through until a later prepare succeeds.
    pub fn prepare(&mut self, config: EngineConfig) -> Result<(), PrepareError> {
        // Drop the old buffers before allocating the new ones.
        self.lifecycle = Lifecycle::Uninitialized;
        config.validate()?;

        let capacity = NonZeroUsize::new(config.delay_capacity())
            .ok_or(PrepareError::InvalidSampleRate(config.sample_rate))?;

        if config.max_block_size >= capacity.get() {
            nih_warn!(
                "Block size {} is not shorter than the {} sample delay line",
                config.max_block_size,
                capacity
            );
        }
        nih_log!(
            "Echo prepared: {} Hz, {} channel(s), block size {}, delay capacity {} samples",
            config.sample_rate,
            config.channels,
            config.max_block_size,
            capacity
        );

        self.lifecycle = Lifecycle::Prepared(EngineState {
            config,
            delay_line: DelayLine::new(capacity),
        });
        Ok(())
    }

    /// Silence the delay history without reallocating. Used when the
    /// host stops the transport.
    pub fn reset(&mut self) {
        if let Lifecycle::Prepared(state) = &mut self.lifecycle {
            state.delay_line.clear();
        }
    }

    /// Free the delay line. `process` passes audio through afterwards.
    pub fn release(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Prepared(_)) {
            nih_log!("Echo released");
        }
        self.lifecycle = Lifecycle::Released;
    }

    /// Process one block in place.
    ///
    /// `buffers` holds one slice per channel; the block length is the
    /// shortest of them. Buffers are left untouched when the engine is
    /// not prepared, or when they carry no channels or more channels
    /// than the engine was prepared for.
    ///
    /// Never allocates, blocks or panics.
    pub fn process(&mut self, buffers: &mut [&mut [f32]], snapshot: &ParamSnapshot) {
        let Lifecycle::Prepared(state) = &mut self.lifecycle else {
            return;
        };

        let channel_count = buffers.len();
        if channel_count == 0 || channel_count > state.config.channels {
            return;
        }
        let num_samples = buffers.iter().map(|b| b.len()).min().unwrap_or(0);
        nih_debug_assert!(num_samples <= state.config.max_block_size);

        // Everything derived from parameters is fixed for the block.
        let settings = snapshot.block_settings(state.config.sample_rate);
        let delay = state.delay_line.clamp_delay(settings.delay_samples);
        let rotator = StereoRotator::new(settings.bank);
        let mixer = FeedbackMixer::new(settings.pingpong, settings.feedback);
        let delay_line = &mut state.delay_line;

        for index in 0..num_samples {
            // a. Dry input.
            let mut dry = [0.0_f32; MAX_CHANNELS];
            for (channel, buffer) in buffers.iter().enumerate() {
                dry[channel] = flush_non_finite(buffer[index]);
            }

            // b. + c. Bank rotation (stereo only), then gain.
            let input = rotator
                .process(StereoFrame::from_channels(&dry[..channel_count]), channel_count)
                .scale(settings.gain);

            // d. + e. Delayed samples and ping-pong blend. A mono
            // signal's "other" channel is itself.
            let wet = if channel_count == 2 {
                mixer.blend(StereoFrame::new(
                    delay_line.read_delayed(0, delay),
                    delay_line.read_delayed(1, delay),
                ))
            } else {
                let own = delay_line.read_delayed(0, delay);
                let wet = mixer.blend_channel(own, own);
                StereoFrame::new(wet, wet)
            };

            for (channel, buffer) in buffers.iter_mut().enumerate() {
                let wet_sample = wet.channel(channel);

                // f. Output.
                buffer[index] = settings.dry * dry[channel] + settings.wet * wet_sample;

                // g. Feedback. Subnormals are flushed so a decaying
                // echo reaches zero instead of lingering as denormals.
                delay_line.write(
                    channel,
                    flush_denormal(mixer.feedback_sample(input.channel(channel), wet_sample)),
                );
            }

            // h. One cursor step per sample, shared by both channels.
            delay_line.advance();
        }

        nih_debug_assert!(delay_line.write_pos() < delay_line.capacity());
    }

    /// How many samples of echo follow the input for these settings.
    ///
    /// The tail lasts until the repeats decay below -60 dB: with
    /// feedback `f`, after `N` repeats the level is `f^N`, so
    /// `N = log10(0.001) / log10(f)`. `None` means the echo never
    /// decays (feedback at 100%). An engine that is not prepared has no
    /// tail.
    pub fn tail_samples(&self, snapshot: &ParamSnapshot) -> Option<u32> {
        let Lifecycle::Prepared(state) = &self.lifecycle else {
            return Some(0);
        };

        let settings = snapshot.block_settings(state.config.sample_rate);
        let delay = state.delay_line.clamp_delay(settings.delay_samples) as f32;

        if settings.feedback >= 1.0 {
            None
        } else if settings.feedback > 0.001 {
            let repeats = TAIL_FLOOR_LOG10 / settings.feedback.log10();
            Some((repeats * delay).ceil() as u32)
        } else {
            // No feedback: a single echo, one delay period later.
            Some(delay as u32)
        }
    }
}
