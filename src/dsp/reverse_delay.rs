//! # Reverse Delay Engine
//!
//! The engine records the input in chunks of `chunk_samples`, flips each
//! finished chunk in time, and plays it back while the next chunk is being
//! recorded. The listener hears every chunk backwards, one chunk late.
//!
//! ```text
//!  time ──►   chunk 0        chunk 1        chunk 2
//!  record     [ a b c d ]    [ e f g h ]    [ i j k l ]
//!  play       [ silence ]    [ d c b a ]    [ h g f e ]
//! ```
//!
//! ## Two Clocks, Two Wraps
//!
//! A write cursor walks the record buffer and a play cursor walks the
//! playback buffer. Both advance once per frame and both wrap at
//! `chunk_samples`, but their wraps are handled as two separate events:
//!
//! - **write wrap**: the record buffer is full. Reverse-copy it into the
//!   playback buffer of the same slot and clear it.
//! - **play wrap**: the playback buffer is exhausted. Flip roles, so the
//!   slot that was recording is now the one being heard.
//!
//! Keep them separate. The write wrap always runs first so that the flip
//! lands on a playback buffer that has just been refilled.

use nih_plug::prelude::*;

use super::chunk_buffer::{BufferBank, Slot, NUM_CHANNELS};
use super::crossfade::edge_gain;
use super::timing;

/// Feedback is capped below unity so the recirculating signal always
/// decays.
pub const MAX_FEEDBACK: f32 = 0.98;

/// Longest delay time the parameter surface offers. Used to pre-reserve
/// buffer space at setup.
pub const MAX_TIME_MS: f32 = 2000.0;

/// The four control values the engine reads at the top of every block.
///
/// This is a plain snapshot so the engine can be driven without a host;
/// the plugin fills it from its atomically stored parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    /// Chunk length in milliseconds.
    pub time_ms: f32,
    /// Dry/wet balance, 0 = dry only, 1 = wet only.
    pub mix: f32,
    /// Amount of the playback signal fed back into the recording.
    pub feedback: f32,
    /// Length of the edge cross-fade in milliseconds.
    pub fade_ms: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            time_ms: 500.0,
            mix: 0.7,
            feedback: 0.35,
            fade_ms: 5.0,
        }
    }
}

impl Controls {
    /// Replace any value that is not a number with its default.
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |value: f32, default: f32| if value.is_finite() { value } else { default };
        Self {
            time_ms: pick(self.time_ms, defaults.time_ms),
            mix: pick(self.mix, defaults.mix),
            feedback: pick(self.feedback, defaults.feedback),
            fade_ms: pick(self.fade_ms, defaults.fade_ms),
        }
    }
}

/// The streaming reverse-delay engine. Owned by the audio thread.
pub struct ReverseDelay {
    sample_rate: f64,

    /// Current chunk length; every buffer in `bank` has this length.
    chunk_samples: usize,
    fade_samples: usize,

    write_idx: usize,
    play_idx: usize,

    /// Slot whose record buffer is being written. The other slot's
    /// playback buffer is being heard.
    recording: Slot,

    bank: BufferBank,
}

impl Default for ReverseDelay {
    fn default() -> Self {
        Self {
            sample_rate: timing::FALLBACK_SAMPLE_RATE,
            // Zero means "nothing allocated yet"; the first resolve always
            // allocates.
            chunk_samples: 0,
            fade_samples: 0,
            write_idx: 0,
            play_idx: 0,
            recording: Slot::A,
            bank: BufferBank::default(),
        }
    }
}

impl ReverseDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current chunk length in samples. This is also the latency the
    /// plugin reports to the host.
    pub fn chunk_samples(&self) -> usize {
        self.chunk_samples
    }

    /// (Re)initialize for `sample_rate`. Must be called before the first
    /// block and whenever the sample rate changes.
    ///
    /// Buffers are resized if the chunk length changed and cleared either
    /// way; both cursors go back to zero with slot A recording. Returns the
    /// resolved chunk length.
    pub fn prepare(&mut self, sample_rate: f32, controls: &Controls) -> usize {
        self.sample_rate = timing::sanitize_sample_rate(f64::from(sample_rate));
        let controls = controls.sanitized();

        // Reserve for the longest chunk the time parameter can ask for, so
        // automating the time knob later resizes without allocating.
        self.bank
            .reserve(timing::chunk_samples(MAX_TIME_MS, self.sample_rate));

        if self.resolve(&controls).is_none() {
            self.bank.reset_soft();
        }
        self.rewind();

        nih_log!(
            "reverse delay prepared at {} Hz: chunk {} samples, fade {} samples",
            self.sample_rate,
            self.chunk_samples,
            self.fade_samples
        );

        self.chunk_samples
    }

    /// Clear all buffers and rewind both cursors without reallocating.
    /// Used on transport restarts.
    pub fn reset(&mut self) {
        self.bank.reset_soft();
        self.rewind();
    }

    fn rewind(&mut self) {
        self.write_idx = 0;
        self.play_idx = 0;
        self.recording = Slot::A;
    }

    /// Turn the controls into sample counts. Reallocates (and rewinds) if
    /// the chunk length changed, returning the new length in that case.
    fn resolve(&mut self, controls: &Controls) -> Option<usize> {
        let chunk = timing::chunk_samples(controls.time_ms, self.sample_rate);

        let resized = if chunk != self.chunk_samples {
            self.chunk_samples = chunk;
            // The one allocation the audio thread may perform. It stays
            // within the capacity reserved in `prepare()` for any time the
            // parameter range allows. Nothing else goes in here: this runs
            // inside `process()`.
            nih_plug::util::permit_alloc(|| self.bank.allocate(chunk));
            self.rewind();
            Some(chunk)
        } else {
            None
        };

        self.fade_samples = timing::fade_samples(controls.fade_ms, chunk, self.sample_rate);
        resized
    }

    /// Process one block in place.
    ///
    /// `channels` holds one slice per host channel. The first two are run
    /// through the reverse delay; any further channels are silenced. The
    /// controls are read once at the top of the block.
    ///
    /// Returns the new chunk length if the block started with a resize, so
    /// the caller can report the new latency.
    pub fn process_block(
        &mut self,
        channels: &mut [&mut [f32]],
        controls: &Controls,
    ) -> Option<usize> {
        let controls = controls.sanitized();
        let resized = self.resolve(&controls);

        let mix = controls.mix.clamp(0.0, 1.0);
        let feedback = controls.feedback.clamp(0.0, MAX_FEEDBACK);

        let active = channels.len().min(NUM_CHANNELS);
        let num_samples = channels.first().map_or(0, |c| c.len());

        if self.chunk_samples == 0 || num_samples == 0 || active == 0 {
            return resized;
        }

        for n in 0..num_samples {
            for (ch, channel) in channels.iter_mut().take(active).enumerate() {
                let Some(sample) = channel.get_mut(n) else {
                    continue;
                };
                *sample = self.process_sample(ch, *sample, mix, feedback);
            }

            // The cursor clock belongs to channel 0 and ticks once per
            // frame, after every active channel has used the same indices.
            self.advance();
        }

        for channel in channels.iter_mut().skip(NUM_CHANNELS) {
            channel.fill(0.0);
        }

        resized
    }

    /// One sample of one channel: record input plus feedback, read the
    /// reversed playback, fade its edges and blend.
    ///
    /// Every buffer access is bounds-checked. The cursors never leave
    /// `[0, chunk_samples)`, so the checks are a safety net only.
    fn process_sample(&mut self, channel: usize, input: f32, mix: f32, feedback: f32) -> f32 {
        let (write_idx, play_idx, fade_samples) =
            (self.write_idx, self.play_idx, self.fade_samples);
        let (record, playback) = self.bank.active_pair(self.recording);
        let play_len = playback.len();

        let played = playback
            .channel(channel)
            .and_then(|p| p.get(play_idx))
            .copied();

        let fb = played.map_or(0.0, |s| s * feedback);

        if let Some(slot) = record
            .channel_mut(channel)
            .and_then(|r| r.get_mut(write_idx))
        {
            *slot = input + fb;
        }

        let wet = played.map_or(0.0, |s| s * edge_gain(play_idx, play_len, fade_samples));

        (1.0 - mix) * input + mix * wet
    }

    /// Tick both cursors and handle their wraps, write side first.
    fn advance(&mut self) {
        self.write_idx += 1;
        self.play_idx += 1;

        if self.write_idx >= self.chunk_samples {
            self.bank.commit_recording(self.recording);
            self.write_idx = 0;
        }

        if self.play_idx >= self.chunk_samples {
            self.play_idx = 0;
            self.recording = self.recording.other();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
