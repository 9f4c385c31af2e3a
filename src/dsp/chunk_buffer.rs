//! # Chunk Buffers
//!
//! A reverse delay cannot play a sound backwards until it has heard all of
//! it, so instead of a ring buffer we work in whole *chunks*: a fixed-size
//! block of audio that is recorded front to back, flipped in time, and then
//! played front to back again.
//!
//! ## Ping-Pong Layout
//!
//! We keep two physical slots, **A** and **B**. Each slot owns a *record*
//! buffer (where live input lands) and a *playback* buffer (a reversed
//! copy of the last chunk recorded into that slot):
//!
//! ```text
//!              record          playback
//!   slot A   [ ........ ]  →  [ ........ ]   (reverse-copied when full)
//!   slot B   [ ........ ]  →  [ ........ ]
//! ```
//!
//! At any instant one slot is recording and the *other* slot's playback
//! buffer is being heard. When the roles flip, the slot that was just
//! filled becomes the one we listen to.
//!
//! All four buffers are always the same length (the current chunk size)
//! and always exactly two channels wide.

use nih_plug::prelude::*;

/// Channel count of every chunk buffer. Hosts with mono tracks only use
/// channel 0; channels past this are never processed.
pub const NUM_CHANNELS: usize = 2;

/// One of the two ping-pong slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// The opposite slot.
    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

/// A two-channel block of audio, `len` samples per channel.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    channels: [Vec<f32>; NUM_CHANNELS],
}

impl ChunkBuffer {
    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(channel).map(Vec::as_mut_slice)
    }

    /// Make sure each channel can grow to `max_len` without reallocating.
    fn reserve_total(&mut self, max_len: usize) {
        for channel in &mut self.channels {
            channel.reserve_exact(max_len.saturating_sub(channel.len()));
        }
    }

    /// Resize every channel to `len` and fill it with silence. Nothing that
    /// was in the buffer before survives.
    fn resize(&mut self, len: usize) {
        for channel in &mut self.channels {
            channel.clear();
            channel.resize(len, 0.0);
        }
    }

    /// Fill every channel with silence, keeping the length.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// Write a time-reversed copy of `self` into `out`, channel by channel:
    /// `out[i] = self[N - 1 - i]`.
    ///
    /// `out` always has the same length as `self` inside the engine, so the
    /// resize below is a no-op on the audio thread.
    pub fn reverse_into(&self, out: &mut ChunkBuffer) {
        nih_debug_assert_eq!(self.len(), out.len());

        for (src, dst) in self.channels.iter().zip(out.channels.iter_mut()) {
            if dst.len() != src.len() {
                dst.resize(src.len(), 0.0);
            }
            for (d, s) in dst.iter_mut().zip(src.iter().rev()) {
                *d = *s;
            }
        }
    }
}

/// The four buffers of the reverse delay: record and playback for slot A,
/// record and playback for slot B.
#[derive(Debug, Default)]
pub struct BufferBank {
    record: [ChunkBuffer; 2],
    playback: [ChunkBuffer; 2],
}

impl BufferBank {
    /// Current chunk length shared by all four buffers.
    pub fn chunk_len(&self) -> usize {
        self.record[0].len()
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut ChunkBuffer> {
        self.record.iter_mut().chain(self.playback.iter_mut())
    }

    /// Pre-reserve room for chunks up to `max_len` so that a later
    /// [`allocate()`](Self::allocate) within that size does not touch the
    /// allocator. Called from setup only.
    pub fn reserve(&mut self, max_len: usize) {
        for buffer in self.all_mut() {
            buffer.reserve_total(max_len);
        }
    }

    /// Resize all four buffers to `chunk_len` and zero-fill them.
    pub fn allocate(&mut self, chunk_len: usize) {
        for buffer in self.all_mut() {
            buffer.resize(chunk_len);
        }
    }

    /// Zero-fill all four buffers without changing their size.
    pub fn reset_soft(&mut self) {
        for buffer in self.all_mut() {
            buffer.clear();
        }
    }

    /// The record buffer of `recording` together with the playback buffer
    /// of the opposite slot: the pair the audio loop works on.
    pub fn active_pair(&mut self, recording: Slot) -> (&mut ChunkBuffer, &ChunkBuffer) {
        (
            &mut self.record[recording.index()],
            &self.playback[recording.other().index()],
        )
    }

    /// Reverse-copy the filled record buffer of `slot` into the playback
    /// buffer of the same slot, then clear the record buffer.
    pub fn commit_recording(&mut self, slot: Slot) {
        let record = &mut self.record[slot.index()];
        record.reverse_into(&mut self.playback[slot.index()]);
        record.clear();
    }

    #[cfg(test)]
    pub(crate) fn record(&self, slot: Slot) -> &ChunkBuffer {
        &self.record[slot.index()]
    }

    #[cfg(test)]
    pub(crate) fn playback(&self, slot: Slot) -> &ChunkBuffer {
        &self.playback[slot.index()]
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
