//! # Millisecond → Sample Conversions
//!
//! The user thinks in milliseconds; the engine works in whole samples.
//! Every conversion here rounds to the nearest sample and then clamps, so
//! the engine never sees a chunk too short to hold a fade or so long that
//! the buffers balloon.
//!
//! At 44100 Hz:
//! - 500 ms chunk → 22050 samples
//! - 5 ms fade    → 220 samples (220.5 rounds to even)

/// Used whenever the host reports a sample rate that is zero, negative or
/// not a number.
pub const FALLBACK_SAMPLE_RATE: f64 = 44_100.0;

/// Shortest allowed chunk, in samples.
pub const MIN_CHUNK_SAMPLES: i64 = 256;

/// Longest allowed chunk, in seconds of audio.
pub const MAX_CHUNK_SECONDS: f64 = 4.0;

pub const MIN_FADE_SAMPLES: i64 = 16;
pub const MAX_FADE_SAMPLES: i64 = 2048;

/// Replace an unusable sample rate with [`FALLBACK_SAMPLE_RATE`].
pub fn sanitize_sample_rate(sample_rate: f64) -> f64 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        FALLBACK_SAMPLE_RATE
    }
}

/// `ms * sample_rate / 1000`, rounded half-to-even.
fn ms_to_samples(ms: f32, sample_rate: f64) -> i64 {
    (f64::from(ms) * 0.001 * sample_rate).round_ties_even() as i64
}

/// Clamp `value` into `[lo, hi]`, checking the lower bound first. Unlike
/// `Ord::clamp` this never panics when `lo > hi`; the lower bound wins.
fn limit(lo: i64, hi: i64, value: i64) -> i64 {
    if value < lo {
        lo
    } else if hi < value {
        hi
    } else {
        value
    }
}

/// Chunk length in samples for a delay time of `time_ms`.
pub fn chunk_samples(time_ms: f32, sample_rate: f64) -> usize {
    let max = (MAX_CHUNK_SECONDS * sample_rate) as i64;
    limit(MIN_CHUNK_SAMPLES, max, ms_to_samples(time_ms, sample_rate)).max(0) as usize
}

/// Fade length in samples for a fade time of `fade_ms`, kept strictly
/// shorter than `chunk_samples` so one fade never spans a whole chunk.
pub fn fade_samples(fade_ms: f32, chunk_samples: usize, sample_rate: f64) -> usize {
    let fade = limit(
        MIN_FADE_SAMPLES,
        MAX_FADE_SAMPLES,
        ms_to_samples(fade_ms, sample_rate),
    );
    let ceiling = (chunk_samples as i64 - 1).max(1);
    limit(1, ceiling, fade) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes_at_44k1() {
        let chunk = chunk_samples(500.0, 44_100.0);
        assert_eq!(chunk, 22_050);
        assert_eq!(fade_samples(5.0, chunk, 44_100.0), 220);
    }

    #[test]
    fn test_chunk_clamps() {
        // 1 ms is 44 samples, well under the floor.
        assert_eq!(chunk_samples(1.0, 44_100.0), 256);
        // 10 s is more than four seconds of audio.
        assert_eq!(chunk_samples(10_000.0, 44_100.0), 176_400);
        assert_eq!(chunk_samples(-20.0, 44_100.0), 256);
    }

    #[test]
    fn test_fade_clamps() {
        assert_eq!(fade_samples(0.0, 22_050, 44_100.0), 16);
        assert_eq!(fade_samples(100.0, 22_050, 44_100.0), 2048);
    }

    /// The longest fade at the shortest time still fits inside a chunk.
    #[test]
    fn test_max_fade_at_min_time_stays_below_chunk() {
        for sample_rate in [22_050.0, 44_100.0, 48_000.0, 96_000.0, 192_000.0] {
            let chunk = chunk_samples(50.0, sample_rate);
            let fade = fade_samples(30.0, chunk, sample_rate);
            assert!(
                fade < chunk,
                "fade {fade} not below chunk {chunk} at {sample_rate} Hz"
            );
        }
        assert_eq!(chunk_samples(50.0, 44_100.0), 2205);
    }

    /// A chunk pinned to the floor pulls the fade below it.
    #[test]
    fn test_fade_limited_by_short_chunk() {
        let chunk = chunk_samples(1.0, 44_100.0);
        assert_eq!(chunk, 256);
        assert_eq!(fade_samples(30.0, chunk, 44_100.0), 255);
    }

    /// Degenerate ranges resolve to the lower bound instead of panicking.
    #[test]
    fn test_tiny_sample_rate_does_not_panic() {
        assert_eq!(chunk_samples(500.0, 10.0), 256);
        assert_eq!(fade_samples(5.0, 1, 10.0), 1);
    }

    #[test]
    fn test_sample_rate_fallback() {
        assert_eq!(sanitize_sample_rate(0.0), FALLBACK_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(-48_000.0), FALLBACK_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(f64::NAN), FALLBACK_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(48_000.0), 48_000.0);
    }
}
