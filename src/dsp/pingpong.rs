//! # Ping-Pong Feedback Mixer
//!
//! A plain stereo delay keeps each channel to itself: the left echo comes
//! back on the left, the right echo on the right. A ping-pong delay lets
//! echoes cross over, so repeats bounce between the speakers.
//!
//! The crossover amount is a single ratio `p`:
//!
//! ```text
//! wet_L = (1 - p) * delayed_L + p * delayed_R
//! wet_R = (1 - p) * delayed_R + p * delayed_L
//! ```
//!
//! - `p = 0.0` → no cross-talk, each side hears only its own echo
//! - `p = 0.5` → both sides hear the average of the two echoes
//! - `p = 1.0` → full swap, every repeat changes side
//!
//! The blended `wet` signal is used twice: it is mixed into the output,
//! and it is what gets fed back into the delay line. Because the
//! feedback is blended too, a repeat that arrived on the right is
//! written back into the *left* buffer at `p = 1.0`, and the next repeat
//! lands on the left again. That back-and-forth is the ping-pong.

use super::StereoFrame;

/// Cross-channel blend and feedback gain for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackMixer {
    /// Ratio of the opposite channel in each wet signal, `[0, 1]`.
    pingpong: f32,
    /// How much of the wet signal re-enters the delay line, `[0, 1]`.
    feedback: f32,
}

impl FeedbackMixer {
    /// Both ratios are clamped to `[0, 1]`.
    pub fn new(pingpong: f32, feedback: f32) -> Self {
        Self {
            pingpong: pingpong.clamp(0.0, 1.0),
            feedback: feedback.clamp(0.0, 1.0),
        }
    }

    /// Blend the delayed samples of both channels into the wet signal.
    #[inline]
    pub fn blend(&self, delayed: StereoFrame) -> StereoFrame {
        StereoFrame::new(
            self.blend_channel(delayed.left, delayed.right),
            self.blend_channel(delayed.right, delayed.left),
        )
    }

    /// Blend one channel's delayed sample with the opposite channel's.
    ///
    /// For a mono signal the opposite channel is the channel itself, so
    /// the blend reduces to `own_delayed`.
    #[inline]
    pub fn blend_channel(&self, own_delayed: f32, other_delayed: f32) -> f32 {
        (1.0 - self.pingpong) * own_delayed + self.pingpong * other_delayed
    }

    /// The value written back into the delay line for one channel: the
    /// gained input plus the scaled wet signal of that same channel.
    #[inline]
    pub fn feedback_sample(&self, gained_input: f32, wet: f32) -> f32 {
        gained_input + self.feedback * wet
    }
}
