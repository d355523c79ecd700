//! # Delay Line (Shared-Cursor Ring Buffer)
//!
//! A delay line stores audio samples and lets you read them back after a
//! whole number of samples. The echo keeps one contiguous buffer per
//! channel, but both channels share a single write cursor: the left and
//! right "tapes" move under the same write head.
//!
//! Sharing the cursor is what makes ping-pong routing cheap. For any
//! sample index, the delayed left and right values live at the *same*
//! slot of their respective buffers, so blending them across channels is
//! a pair of array reads.
//!
//! Per sample, the engine:
//!
//! 1. Reads the delayed sample of every channel from
//!    `(write_pos - delay_samples)`, wrapping around the buffer start.
//! 2. Writes the new (input + feedback) sample of every channel at
//!    `write_pos`.
//! 3. Advances `write_pos` once, wrapping back to 0 at the end.
//!
//! Reads are not interpolated. The delay parameter is an integer number
//! of milliseconds and is only re-read at block boundaries, so the read
//! position never glides between sample slots.

use std::num::NonZeroUsize;

/// Number of channel buffers a delay line carries.
pub const MAX_CHANNELS: usize = 2;

/// A stereo ring buffer with a write cursor shared across both channels.
///
/// The buffers are allocated once, in [`DelayLine::new`], during
/// `prepare`. Nothing in the read/write/advance path allocates.
pub struct DelayLine {
    /// One circular buffer per channel, each `capacity` samples long.
    buffers: [Vec<f32>; MAX_CHANNELS],

    /// Where the next sample of every channel will be stored. Always in
    /// `[0, capacity)`.
    write_pos: usize,

    /// Length of each channel buffer. Never zero.
    capacity: usize,
}

impl DelayLine {
    /// Create a zero-filled delay line holding `capacity` samples per
    /// channel.
    ///
    /// `NonZeroUsize` rules out an empty ring, which would make every
    /// modulo in the index math divide by zero.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            buffers: [vec![0.0; capacity], vec![0.0; capacity]],
            write_pos: 0,
            capacity,
        }
    }

    /// Number of samples each channel buffer holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The shared write cursor.
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Store `value` at the shared write position of `channel`.
    ///
    /// **Important:** this does NOT advance the cursor. The cursor moves
    /// once per sample, after every channel has been read and written,
    /// via [`advance()`](Self::advance). Out-of-range channels are
    /// ignored.
    pub fn write(&mut self, channel: usize, value: f32) {
        if let Some(buffer) = self.buffers.get_mut(channel) {
            buffer[self.write_pos] = value;
        }
    }

    /// Read the sample of `channel` written `delay_samples` steps ago.
    ///
    /// The delay is clamped to `[0, capacity - 1]`: asking for more
    /// history than the ring holds returns the oldest slot instead of
    /// wrapping around into the future. A delay of zero reads the
    /// current slot, i.e. the value written `capacity` samples ago.
    ///
    /// ```text
    /// read_index = (write_pos + capacity - delay) % capacity
    /// ```
    ///
    /// Out-of-range channels read as silence.
    pub fn read_delayed(&self, channel: usize, delay_samples: usize) -> f32 {
        let Some(buffer) = self.buffers.get(channel) else {
            return 0.0;
        };
        let delay = self.clamp_delay(delay_samples);
        buffer[(self.write_pos + self.capacity - delay) % self.capacity]
    }

    /// Clamp a delay length to what the ring can hold.
    pub fn clamp_delay(&self, delay_samples: usize) -> usize {
        delay_samples.min(self.capacity - 1)
    }

    /// Move the shared write cursor forward by one sample.
    pub fn advance(&mut self) {
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Zero every channel and reset the cursor to the first slot.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        self.write_pos = 0;
    }
}
