//! # Stereo Rotator ("Bank")
//!
//! The bank control tilts the stereo image before it enters the delay,
//! like banking an aircraft: the centre of the image slides toward one
//! side while the side information stays where it was.
//!
//! ## Mid-Side Encoding
//!
//! A stereo pair can be rewritten as its sum and its difference:
//!
//! ```text
//! M = 0.5 * (L + R)      "mid": what both channels have in common
//! S = L - R              "side": what makes them different
//! ```
//!
//! Decoding is `L = M + S/2` and `R = M - S/2`. The rotator only touches
//! the mid term, scaling it differently on each output:
//!
//! ```text
//! rotated_L = gL * M + S/2     gL = √2 · cos(π/4 · (1 + bank))
//! rotated_R = gR * M - S/2     gR = √2 · cos(π/4 · (1 - bank))
//! ```
//!
//! ## Equal Power
//!
//! The two cosine arguments always add up to π/2, so `cos²` of one plus
//! `cos²` of the other is 1 and `gL² + gR² = 2` for every bank setting.
//! The centre image keeps its loudness as it moves. At `bank = 0` both
//! gains are exactly 1 and the rotator is the identity:
//!
//! ```text
//! bank = -1 → gL = √2, gR = 0   (mid fully left)
//! bank =  0 → gL = 1,  gR = 1   (unchanged)
//! bank = +1 → gL = 0,  gR = √2  (mid fully right)
//! ```

use std::f32::consts::{FRAC_PI_4, SQRT_2};

use super::StereoFrame;

/// Mid gains for one bank setting.
///
/// Computing the cosines is the expensive part, so a rotator is built
/// once per block and then applied to every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoRotator {
    left_gain: f32,
    right_gain: f32,
}

impl StereoRotator {
    /// Build a rotator for `bank` in `[-1, 1]`. Values outside the range
    /// are clamped.
    pub fn new(bank: f32) -> Self {
        let bank = bank.clamp(-1.0, 1.0);
        if bank == 0.0 {
            // cos(π/4) · √2 is 1 only up to rounding; keep the neutral
            // setting bit-exact.
            return Self::neutral();
        }
        Self {
            left_gain: SQRT_2 * (FRAC_PI_4 * (1.0 + bank)).cos(),
            right_gain: SQRT_2 * (FRAC_PI_4 * (1.0 - bank)).cos(),
        }
    }

    /// The identity rotation.
    pub const fn neutral() -> Self {
        Self {
            left_gain: 1.0,
            right_gain: 1.0,
        }
    }

    /// Rotate one stereo frame.
    #[inline]
    pub fn rotate(&self, frame: StereoFrame) -> StereoFrame {
        let mid = 0.5 * (frame.left + frame.right);
        let half_side = 0.5 * (frame.left - frame.right);
        StereoFrame::new(
            self.left_gain * mid + half_side,
            self.right_gain * mid - half_side,
        )
    }

    /// Rotate a frame made of `channel_count` channels.
    ///
    /// Only a true stereo pair has a stereo field to rotate; any other
    /// channel count passes through untouched.
    #[inline]
    pub fn process(&self, frame: StereoFrame, channel_count: usize) -> StereoFrame {
        if channel_count == 2 {
            self.rotate(frame)
        } else {
            frame
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A centred unit signal is pure mid, so the rotated frame is the
    /// pair of mid gains.
    fn mid_gains(rotator: &StereoRotator) -> (f32, f32) {
        let out = rotator.rotate(StereoFrame::new(1.0, 1.0));
        (out.left, out.right)
    }

    fn assert_close(actual: f32, expected: f32, what: &str) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "{what}: expected {expected}, got {actual}"
        );
    }

    /// bank = 0 must leave any stereo pair unchanged.
    #[test]
    fn test_neutral_bank_is_identity() {
        let rotator = StereoRotator::new(0.0);
        for (l, r) in [(1.0, 0.0), (0.0, 1.0), (0.3, -0.7), (-1.0, -1.0)] {
            let out = rotator.rotate(StereoFrame::new(l, r));
            assert_close(out.left, l, "left");
            assert_close(out.right, r, "right");
        }
    }

    /// Unnormalized, the mid-side law `cos(π/4 (1 ± bank)) · M ± S` is not
    /// neutral at bank 0: a left-only impulse becomes (1.354, -0.646).
    /// The √2 mid gain and the ½ side weight used here bring it back to
    /// (1, 0) while keeping the same cosine law.
    #[test]
    fn test_normalized_law_differs_from_unnormalized_at_zero_bank() {
        let (l, r) = (1.0_f32, 0.0_f32);
        let mid = 0.5 * (l + r);
        let side = l - r;
        let coeff = FRAC_PI_4.cos();
        let unnormalized = (coeff * mid + side, coeff * mid - side);
        assert!((unnormalized.0 - 1.353_553).abs() < 1e-5, "got {}", unnormalized.0);
        assert!((unnormalized.1 + 0.646_447).abs() < 1e-5, "got {}", unnormalized.1);

        let out = StereoRotator::new(0.0).rotate(StereoFrame::new(l, r));
        assert_eq!(out, StereoFrame::new(1.0, 0.0));
    }

    /// The gains also reduce to 1 when computed through the cosines.
    #[test]
    fn test_near_zero_bank_is_close_to_identity() {
        let rotator = StereoRotator::new(1e-9);
        let (gl, gr) = mid_gains(&rotator);
        assert_close(gl, 1.0, "left gain");
        assert_close(gr, 1.0, "right gain");
    }

    /// gL² + gR² stays at 2 across the whole bank range. Checked
    /// empirically on a grid, including the extremes.
    #[test]
    fn test_equal_power_across_range() {
        for step in -45..=45 {
            let bank = step as f32 / 45.0;
            let (gl, gr) = mid_gains(&StereoRotator::new(bank));
            let power = gl * gl + gr * gr;
            assert!(
                (power - 2.0).abs() < 1e-5,
                "power {power} at bank {bank}"
            );
        }
    }

    /// Full bank moves a centred signal entirely to one side.
    #[test]
    fn test_extreme_bank_pans_mid() {
        let centred = StereoFrame::new(0.5, 0.5);

        let right = StereoRotator::new(1.0).rotate(centred);
        assert!(right.left.abs() < 1e-6, "left should be silent, got {}", right.left);
        assert_close(right.right, 0.5 * SQRT_2, "right");

        let left = StereoRotator::new(-1.0).rotate(centred);
        assert_close(left.left, 0.5 * SQRT_2, "left");
        assert!(left.right.abs() < 1e-6, "right should be silent, got {}", left.right);
    }

    /// The side component is never touched by the rotation.
    #[test]
    fn test_side_preserved() {
        let frame = StereoFrame::new(0.8, -0.2);
        for bank in [-1.0, -0.4, 0.25, 1.0] {
            let out = StereoRotator::new(bank).rotate(frame);
            let (gl, gr) = mid_gains(&StereoRotator::new(bank));
            let mid = 0.5 * (frame.left + frame.right);
            assert_close(out.left - gl * mid, 0.5, "left side");
            assert_close(out.right - gr * mid, -0.5, "right side");
        }
    }

    #[test]
    fn test_out_of_range_bank_is_clamped() {
        assert_eq!(StereoRotator::new(3.0), StereoRotator::new(1.0));
        assert_eq!(StereoRotator::new(-3.0), StereoRotator::new(-1.0));
    }

    /// A mono frame is already "rotated".
    #[test]
    fn test_mono_passthrough() {
        let rotator = StereoRotator::new(0.7);
        let frame = StereoFrame::new(0.4, 0.4);
        assert_eq!(rotator.process(frame, 1), frame);
        assert_ne!(rotator.process(frame, 2), frame);
    }
}
