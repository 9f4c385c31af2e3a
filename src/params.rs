//! # Plugin Parameters
//!
//! Four knobs drive the reverse delay. Each one has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to save
//!   and recall presets. Once published, never change these IDs or
//!   existing presets will break.
//! - A **range** and a **default value**.
//!
//! ## No Smoothing
//!
//! Unlike a classic delay, nothing here is smoothed. The time and fade
//! knobs resolve to whole-sample buffer sizes, and a smoother would only
//! turn one resize into dozens of them while the value ramps. Mix and
//! feedback are read once per block, which is already click-free enough
//! for a blend and a recirculation gain.

use nih_plug::prelude::*;

use crate::dsp::reverse_delay::{Controls, MAX_FEEDBACK, MAX_TIME_MS};

/// All user-facing parameters for the reverse delay.
#[derive(Params)]
pub struct ReverseDelayParams {
    /// **Time**: length of each reversed chunk, and therefore the delay
    /// before you hear a passage backwards.
    ///
    /// Range: 50ms to 2000ms. Default: 500ms.
    ///
    /// Skewed so the bottom half of the knob covers roughly 50-540ms,
    /// where short stuttery reversals live.
    #[id = "timeMs"]
    pub time_ms: FloatParam,

    /// **Mix**: dry/wet balance. 0% is the untouched input, 100% is only
    /// the reversed signal.
    #[id = "mix"]
    pub mix: FloatParam,

    /// **Feedback**: how much of the reversed playback is recorded again
    /// into the next chunk. Repeats alternate direction each pass.
    ///
    /// Capped at 98% so the loop always decays.
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// **Fade**: length of the linear ramps at both ends of every
    /// reversed chunk. Longer fades hide the seam between chunks at the
    /// cost of a softer attack.
    #[id = "fadeMs"]
    pub fade_ms: FloatParam,
}

impl Default for ReverseDelayParams {
    fn default() -> Self {
        let defaults = Controls::default();

        Self {
            time_ms: FloatParam::new(
                "Time",
                defaults.time_ms,
                FloatRange::Skewed {
                    min: 50.0,
                    max: MAX_TIME_MS,
                    // A factor of 0.5: plain = min + (max - min) * normalized².
                    factor: FloatRange::skew_factor(-1.0),
                },
            )
            .with_unit(" ms")
            .with_step_size(1.0),

            mix: FloatParam::new("Mix", defaults.mix, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            feedback: FloatParam::new(
                "Feedback",
                defaults.feedback,
                FloatRange::Linear {
                    min: 0.0,
                    max: MAX_FEEDBACK,
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            fade_ms: FloatParam::new(
                "Fade",
                defaults.fade_ms,
                FloatRange::Linear {
                    min: 2.0,
                    max: 30.0,
                },
            )
            .with_unit(" ms")
            .with_step_size(0.1),
        }
    }
}

impl ReverseDelayParams {
    /// Read the current (unsmoothed) value of every parameter.
    ///
    /// Each `FloatParam` stores its value atomically, so this is safe to
    /// call from the audio thread while the host or UI writes new values.
    pub fn controls(&self) -> Controls {
        Controls {
            time_ms: self.time_ms.value(),
            mix: self.mix.value(),
            feedback: self.feedback.value(),
            fade_ms: self.fade_ms.value(),
        }
    }
}
