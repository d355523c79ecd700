//! # Plugin Parameters
//!
//! Parameters are the knobs and sliders the user sees in the DAW. Each
//! parameter has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to
//!   save and recall presets. Once published, never change these IDs
//!   or existing presets will break.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **range** and a **default value**.
//! - A **display transform** (unit suffix, rounding).
//!
//! ## Snapshots Instead of Smoothing
//!
//! The echo reads every parameter exactly once at the start of each
//! block ([`EchoParams::snapshot`]) and holds those values for the whole
//! block. A control thread moving a knob mid-block therefore cannot tear
//! the settings: the worst case is that a change lands one block late.
//! Each individual read is atomic; the set as a whole does not need to
//! be consistent.
//!
//! ## From Knob Values to DSP Values
//!
//! Most knobs are integers in user-facing units (degrees, milliseconds,
//! percent). [`ParamSnapshot::block_settings`] converts them into the
//! plain ratios the DSP code multiplies by:
//!
//! ```text
//! gain     = 10^(dB / 20)
//! bank     = degrees / 45                  [-1, 1]
//! delay    = ms * sample_rate / 1000       samples, truncated
//! pingpong, feedback, dry, wet = % / 100   [0, 1]
//! ```

use nih_plug::prelude::*;

/// Gain range in decibels.
pub const GAIN_DB_RANGE: (f32, f32) = (-24.0, 24.0);
/// Bank range in degrees.
pub const BANK_DEGREES_RANGE: (i32, i32) = (-45, 45);
/// Delay time range in milliseconds.
pub const DELAY_MS_RANGE: (i32, i32) = (1, 999);

/// All user-facing parameters of the echo.
#[derive(Params)]
pub struct EchoParams {
    /// **Gain**: level of the signal entering the delay line, in dB.
    /// Does not affect the dry path.
    #[id = "gain"]
    pub gain: FloatParam,

    /// **Bank**: rotates the stereo image before it is delayed.
    /// -45° banks the centre fully left, +45° fully right.
    #[id = "bank"]
    pub bank: IntParam,

    /// **Delay**: time between the input and its first echo.
    #[id = "delay"]
    pub delay: IntParam,

    /// **Ping Pong**: how much of each echo crosses to the other side.
    #[id = "pingpong"]
    pub pingpong: IntParam,

    /// **Feedback**: how much of each echo is fed back for another
    /// repeat. 0% gives a single echo.
    #[id = "feedback"]
    pub feedback: IntParam,

    /// **Dry**: level of the unprocessed input in the output.
    #[id = "dry"]
    pub dry: IntParam,

    /// **Wet**: level of the echoes in the output.
    #[id = "wet"]
    pub wet: IntParam,
}

impl Default for EchoParams {
    fn default() -> Self {
        let defaults = ParamSnapshot::default();

        Self {
            gain: FloatParam::new(
                "Gain",
                defaults.gain_db,
                FloatRange::Linear {
                    min: GAIN_DB_RANGE.0,
                    max: GAIN_DB_RANGE.1,
                },
            )
            .with_unit(" dB")
            .with_step_size(0.1)
            .with_value_to_string(formatters::v2s_f32_rounded(1)),

            bank: IntParam::new(
                "Bank",
                defaults.bank_degrees,
                IntRange::Linear {
                    min: BANK_DEGREES_RANGE.0,
                    max: BANK_DEGREES_RANGE.1,
                },
            )
            .with_unit("°"),

            delay: IntParam::new(
                "Delay",
                defaults.delay_ms,
                IntRange::Linear {
                    min: DELAY_MS_RANGE.0,
                    max: DELAY_MS_RANGE.1,
                },
            )
            .with_unit(" ms"),

            pingpong: percent_param("Ping Pong", defaults.pingpong_percent),
            feedback: percent_param("Feedback", defaults.feedback_percent),
            dry: percent_param("Dry", defaults.dry_percent),
            wet: percent_param("Wet", defaults.wet_percent),
        }
    }
}

/// An integer 0-100% knob.
fn percent_param(name: &str, default: i32) -> IntParam {
    IntParam::new(name, default, IntRange::Linear { min: 0, max: 100 }).with_unit("%")
}

impl EchoParams {
    /// Read every parameter once. Called at the start of each block.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            gain_db: self.gain.value(),
            bank_degrees: self.bank.value(),
            delay_ms: self.delay.value(),
            pingpong_percent: self.pingpong.value(),
            feedback_percent: self.feedback.value(),
            dry_percent: self.dry.value(),
            wet_percent: self.wet.value(),
        }
    }
}

/// The parameter values for one block, in user-facing units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub gain_db: f32,
    pub bank_degrees: i32,
    pub delay_ms: i32,
    pub pingpong_percent: i32,
    pub feedback_percent: i32,
    pub dry_percent: i32,
    pub wet_percent: i32,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            gain_db: 0.0,
            bank_degrees: 0,
            delay_ms: 214,
            pingpong_percent: 50,
            feedback_percent: 0,
            dry_percent: 100,
            wet_percent: 50,
        }
    }
}

impl ParamSnapshot {
    /// Convert the snapshot into DSP values for a given sample rate.
    ///
    /// Every value is clamped to its declared range first, so a
    /// misbehaving collaborator cannot push the feedback above unity.
    /// The delay length is *not* clamped to the delay line here; the
    /// engine does that against the capacity it actually allocated.
    pub fn block_settings(&self, sample_rate: f32) -> BlockSettings {
        let gain_db = self.gain_db.clamp(GAIN_DB_RANGE.0, GAIN_DB_RANGE.1);
        let bank_degrees = self
            .bank_degrees
            .clamp(BANK_DEGREES_RANGE.0, BANK_DEGREES_RANGE.1);
        let delay_ms = self.delay_ms.clamp(DELAY_MS_RANGE.0, DELAY_MS_RANGE.1);

        BlockSettings {
            gain: if gain_db.is_finite() {
                nih_plug::util::db_to_gain(gain_db)
            } else {
                1.0
            },
            bank: bank_degrees as f32 / BANK_DEGREES_RANGE.1 as f32,
            delay_samples: delay_ms_to_samples(delay_ms, sample_rate),
            pingpong: percent_to_ratio(self.pingpong_percent),
            feedback: percent_to_ratio(self.feedback_percent),
            dry: percent_to_ratio(self.dry_percent),
            wet: percent_to_ratio(self.wet_percent),
        }
    }
}

/// DSP values derived from a [`ParamSnapshot`], fixed for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSettings {
    /// Linear gain applied to the signal entering the delay.
    pub gain: f32,
    /// Stereo rotation in `[-1, 1]`.
    pub bank: f32,
    /// Delay length in whole samples, before clamping to capacity.
    pub delay_samples: usize,
    pub pingpong: f32,
    pub feedback: f32,
    pub dry: f32,
    pub wet: f32,
}

/// `delay_ms * sample_rate / 1000`, truncated toward zero.
///
/// Computed in `f64` so that exact products such as
/// `214 ms * 48000 Hz = 10272 samples` do not round down to 10271.
pub fn delay_ms_to_samples(delay_ms: i32, sample_rate: f32) -> usize {
    let samples = f64::from(delay_ms) * f64::from(sample_rate) / 1000.0;
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

fn percent_to_ratio(percent: i32) -> f32 {
    percent.clamp(0, 100) as f32 / 100.0
}
