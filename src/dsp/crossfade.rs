//! # Edge Cross-Fade
//!
//! Reversing a chunk creates a hard discontinuity where one reversed chunk
//! ends and the next begins: the last sample of a reversed chunk was the
//! *first* sample recorded, and has nothing to do with what follows. A
//! short linear gain ramp at the head and tail of each playback buffer
//! hides most of that click.

/// Direction of a fade ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    /// 0 at position 0, rising to 1 at `fade_len`.
    In,
    /// 1 at position 0, falling to 0 at `fade_len`.
    Out,
}

/// Linear ramp gain for `position` within a window of `fade_len` samples.
///
/// Positions past the window are clamped to it. A zero-length window means
/// "no fade" and always returns 1.
pub fn crossfade_gain(position: usize, fade_len: usize, fade: Fade) -> f32 {
    if fade_len == 0 {
        return 1.0;
    }

    let g = position.min(fade_len) as f32 / fade_len as f32;
    match fade {
        Fade::In => g,
        Fade::Out => 1.0 - g,
    }
}

/// Gain applied to the playback sample at `play_idx` of a playback buffer
/// `play_len` samples long.
///
/// The head of the buffer fades in; the tail uses the fade-out ramp at the
/// mirrored position `play_len - play_idx - 1`. When the two windows
/// overlap (chunks shorter than two fades) the head window wins.
pub fn edge_gain(play_idx: usize, play_len: usize, fade_len: usize) -> f32 {
    if fade_len == 0 {
        1.0
    } else if play_idx < fade_len {
        crossfade_gain(play_idx, fade_len, Fade::In)
    } else if play_len.saturating_sub(play_idx) <= fade_len {
        let mirrored = play_len.saturating_sub(play_idx + 1);
        crossfade_gain(mirrored, fade_len, Fade::Out)
    } else {
        1.0
    }
}
