//! # Reverse Delay: An AU/VST3/CLAP Reverse Delay Plugin
//!
//! Records the input in chunks, flips every finished chunk in time, and
//! plays it back while the next chunk records. Built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug); outputs Audio Unit
//! (AUv2), VST3, and CLAP formats from a single codebase.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬────────────────────────────────────────────── × (1 - mix) ──┐
//!         │                                                             │
//!         │    ┌──────────────────────────────────────────────────┐     │
//!         │    │                 FEEDBACK LOOP                    │     │
//!         │    │                                                  │     │
//!         └──►(+)──► [Record chunk] ══reverse══► [Playback chunk] │     │
//!              ▲       (slot A / B)    copy       (slot B / A)    │     │
//!              │                                       │          │     │
//!              │                                       ├──► × feedback ─┘
//!              │                                       │
//!              │                                       ▼
//!              │                                 [Edge fades]
//!              │                                       │
//!              └───────────────────────────────────────┴── × mix ──►(+)──► Output
//! ```
//!
//! The reversed signal is always one chunk late, so the plugin reports
//! the chunk length as its latency.

mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::reverse_delay::ReverseDelay;
use nih_plug::prelude::*;
use params::ReverseDelayParams;

/// The main plugin struct.
///
/// Parameters (`ReverseDelayParams`) are shared with the host via `Arc`
/// and stored atomically. The engine and its buffers are owned
/// exclusively by the audio thread and only touched in `initialize()`,
/// `reset()` and `process()`.
struct ReverseDelayPlugin {
    params: Arc<ReverseDelayParams>,

    /// The reverse-delay engine: four chunk buffers and two cursors.
    engine: ReverseDelay,
}

impl Default for ReverseDelayPlugin {
    fn default() -> Self {
        Self {
            params: Arc::new(ReverseDelayParams::default()),
            // Buffers stay empty until initialize() knows the sample rate.
            engine: ReverseDelay::new(),
        }
    }
}

impl Plugin for ReverseDelayPlugin {
    const NAME: &'static str = "Reverse Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Mono or stereo, with the output matching the input. The engine
    // always carries two channels of state; mono just leaves the second
    // one idle.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read once per block, so there is nothing to gain
    // from splitting blocks at automation points.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Size the chunk buffers for the host's sample rate and report the
    /// resulting latency.
    ///
    /// The buffers are reserved for the longest chunk the time knob
    /// allows, so moving the knob during playback never has to grow them.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        context: &mut impl InitContext<Self>,
    ) -> bool {
        let chunk = self
            .engine
            .prepare(buffer_config.sample_rate, &self.params.controls());

        context.set_latency_samples(chunk as u32);

        nih_log!(
            "initialized with {} channel(s), latency {chunk} samples",
            audio_io_layout
                .main_input_channels
                .map(NonZeroU32::get)
                .unwrap_or(0)
        );

        true
    }

    /// Called when playback (re)starts or the plugin is un-bypassed.
    ///
    /// Clear the chunks so a new take doesn't open with a reversed
    /// fragment of the last one. The buffer size doesn't change, so this
    /// never allocates.
    fn reset(&mut self) {
        self.engine.reset();
    }

    /// Run one block through the engine.
    ///
    /// The controls are snapshotted once, at the top of the block. If the
    /// time knob moved far enough to change the chunk length, the engine
    /// resizes and we tell the host about the new latency.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let controls = self.params.controls();

        if let Some(chunk) = self.engine.process_block(buffer.as_slice(), &controls) {
            context.set_latency_samples(chunk as u32);
        }

        ProcessStatus::Tail(tail_samples(
            self.engine.chunk_samples(),
            controls.feedback,
        ))
    }
}

/// How long the plugin keeps ringing after the input goes silent.
///
/// The last input chunk needs one chunk to finish recording and another to
/// play back reversed. Every feedback pass adds one more chunk, each
/// quieter by the feedback factor; we stop counting once the repeats fall
/// below -60 dB:
///
/// ```text
/// feedback^N = 0.001  →  N = -3 / log10(feedback)
/// ```
fn tail_samples(chunk_samples: usize, feedback: f32) -> u32 {
    let chunk = chunk_samples as f32;
    let repeats = if feedback > 0.001 {
        -3.0 / feedback.min(dsp::reverse_delay::MAX_FEEDBACK).log10()
    } else {
        0.0
    };

    ((2.0 + repeats) * chunk) as u32
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for ReverseDelayPlugin {
    const CLAP_ID: &'static str = "com.loveless-audio.reverse-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Plays the input back in reversed chunks, with feedback and edge fades");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for ReverseDelayPlugin {
    // `*b"..."` turns a 16-character ASCII literal into the `[u8; 16]`
    // class ID VST3 hosts expect.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssRevDelay001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(ReverseDelayPlugin);
nih_export_vst3!(ReverseDelayPlugin);

// AUv2 entry point for Logic Pro, generated from the CLAP export.
clap_wrapper::export_auv2!();
