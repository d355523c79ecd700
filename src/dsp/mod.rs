//! # DSP (Digital Signal Processing) Primitives
//!
//! The building blocks of the echo, leaves first:
//!
//! - **`delay_line`**: a stereo ring buffer with one write cursor shared
//!   by both channels. This is the only state that survives between
//!   samples.
//!
//! - **`rotator`**: the "bank" control, a mid-side pan that rotates the
//!   stereo field before it enters the delay.
//!
//! - **`pingpong`**: blends the delayed left and right signals into each
//!   other and computes the feedback written back into the delay line.

pub mod delay_line;
pub mod pingpong;
pub mod rotator;

/// One sample of a stereo signal.
///
/// Frames only live for a single iteration of the per-sample loop; they
/// are never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Build a frame from per-channel values. A mono signal fills both
    /// sides with the same value.
    pub fn from_channels(channels: &[f32]) -> Self {
        match channels {
            [] => Self::default(),
            [mono] => Self::new(*mono, *mono),
            [left, right, ..] => Self::new(*left, *right),
        }
    }

    /// The value for channel 0 (left) or 1 (right).
    pub fn channel(&self, channel: usize) -> f32 {
        if channel == 0 {
            self.left
        } else {
            self.right
        }
    }

    /// Multiply both sides by `gain`.
    pub fn scale(self, gain: f32) -> Self {
        Self::new(self.left * gain, self.right * gain)
    }
}

/// Replace NaN and infinities with silence.
///
/// A single non-finite sample written into the delay line would keep
/// recirculating through the feedback path forever.
#[inline]
pub fn flush_non_finite(sample: f32) -> f32 {
    if sample.is_finite() {
        sample
    } else {
        0.0
    }
}

/// Replace subnormal values with zero.
///
/// The audio thread normally runs with flush-to-zero set by the plugin
/// wrapper. Flushing on the way into the delay line keeps the stored
/// history free of denormals even when it is not.
#[inline]
pub fn flush_denormal(sample: f32) -> f32 {
    if sample.is_subnormal() {
        0.0
    } else {
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_channels() {
        assert_eq!(StereoFrame::from_channels(&[]), StereoFrame::default());
        assert_eq!(
            StereoFrame::from_channels(&[0.3]),
            StereoFrame::new(0.3, 0.3)
        );
        assert_eq!(
            StereoFrame::from_channels(&[0.1, -0.2]),
            StereoFrame::new(0.1, -0.2)
        );
    }

    #[test]
    fn test_channel_accessor() {
        let frame = StereoFrame::new(1.0, 2.0);
        assert_eq!(frame.channel(0), 1.0);
        assert_eq!(frame.channel(1), 2.0);
    }

    #[test]
    fn test_flush_non_finite() {
        assert_eq!(flush_non_finite(0.5), 0.5);
        assert_eq!(flush_non_finite(f32::NAN), 0.0);
        assert_eq!(flush_non_finite(f32::INFINITY), 0.0);
        assert_eq!(flush_non_finite(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-39), 0.0);
        assert_eq!(flush_denormal(-1e-40), 0.0);
        assert_eq!(flush_denormal(f32::MIN_POSITIVE), f32::MIN_POSITIVE);
        assert_eq!(flush_denormal(0.25), 0.25);
        assert_eq!(flush_denormal(0.0), 0.0);
    }
}
