//! # Dr Echo: A Stereo Ping-Pong Echo (AU/VST3/CLAP)
//!
//! A stereo echo built with [nih-plug](https://github.com/robbert-vdh/nih-plug).
//! Outputs Audio Unit (AUv2), VST3, and CLAP formats from a single
//! codebase. The DSP lives in [`engine`] and [`dsp`]; this file is only
//! the plugin shell that connects the host to the engine.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬──────────────────────────────────────────────── × dry ──────┐
//!         │                                                             │
//!         └──► [Bank] ──► × gain ──►(+)──► [Delay L/R] ──► [Ping-Pong] ─┤
//!              (mid-side            ▲                         │         │
//!               rotation)           └──────── × feedback ◄────┤         │
//!                                                             │         │
//!                                                             └─ × wet ►(+)──► Output
//! ```
//!
//! ## Host Callbacks
//!
//! | host            | engine                                   |
//! |-----------------|------------------------------------------|
//! | `initialize()`  | [`EchoEngine::prepare`]                  |
//! | `reset()`       | [`EchoEngine::reset`]                    |
//! | `deactivate()`  | [`EchoEngine::release`]                  |
//! | `process()`     | [`EchoEngine::process`] with a snapshot  |

pub mod dsp;
pub mod engine;
pub mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use engine::{EchoEngine, EngineConfig};
use nih_plug::prelude::*;
use params::EchoParams;

/// The main plugin struct.
///
/// Parameters (`EchoParams`) are shared with the host via `Arc` and can
/// be written from any thread. The engine is owned exclusively by the
/// audio thread and only touched from the host callbacks below, which
/// the host never runs concurrently with `process()`.
struct DrEcho {
    params: Arc<EchoParams>,
    engine: EchoEngine,
}

impl Default for DrEcho {
    fn default() -> Self {
        Self {
            params: Arc::new(EchoParams::default()),
            // Uninitialized until the host calls initialize().
            engine: EchoEngine::new(),
        }
    }
}

impl Plugin for DrEcho {
    const NAME: &'static str = "Dr Echo";
    const VENDOR: &'static str = "Dr Echo Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo is the layout the bank and ping-pong controls are made for,
    // so it comes first. Mono is accepted and runs without rotation or
    // cross-talk. Input and output always match.
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
    // from having the host split blocks at automation points.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is first loaded, or when the sample rate or
    /// channel layout changes. All allocation happens here.
    ///
    /// Returning `false` tells the host this configuration cannot be
    /// used. The engine stays uninitialized in that case and would pass
    /// audio through untouched.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(0);

        let config = EngineConfig::new(
            buffer_config.sample_rate,
            buffer_config.max_buffer_size as usize,
            channels,
        );

        match self.engine.prepare(config) {
            Ok(()) => true,
            Err(err) => {
                nih_error!("Cannot initialize Dr Echo: {err}");
                false
            }
        }
    }

    /// Called when playback stops or the plugin is bypassed. Clears the
    /// echo history so old repeats don't bleed into the next playback.
    fn reset(&mut self) {
        self.engine.reset();
    }

    fn deactivate(&mut self) {
        self.engine.release();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // One read of every parameter for the whole block.
        let snapshot = self.params.snapshot();

        self.engine.process(buffer.as_slice(), &snapshot);

        // Tell the host how long the echoes last so it keeps calling
        // process() after the input goes silent.
        match self.engine.tail_samples(&snapshot) {
            Some(tail) => ProcessStatus::Tail(tail),
            None => ProcessStatus::KeepAlive,
        }
    }
}

impl ClapPlugin for DrEcho {
    const CLAP_ID: &'static str = "com.dr-echo-audio.dr-echo";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A stereo ping-pong echo with a mid-side bank control");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for DrEcho {
    // 16 ASCII bytes, unique to this plugin.
    const VST3_CLASS_ID: [u8; 16] = *b"DrEchoStereoDly1";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay, Vst3SubCategory::Stereo];
}

// nih_export_clap! exports the `clap_entry` symbol for CLAP hosts.
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts.
nih_export_clap!(DrEcho);
nih_export_vst3!(DrEcho);

// Re-export the CLAP entry point as an AUv2 component for Logic Pro.
clap_wrapper::export_auv2!();

#[cfg(test)]
mod tests {
    use super::*;

    /// A freshly loaded plugin has not been prepared yet.
    #[test]
    fn test_default_plugin_is_uninitialized() {
        let plugin = DrEcho::default();
        assert_eq!(plugin.engine.status(), engine::EngineStatus::Uninitialized);
    }

    /// The host sees every parameter under its persisted ID.
    #[test]
    fn test_parameter_ids() {
        let plugin = DrEcho::default();
        let ids: Vec<String> = plugin
            .params()
            .param_map()
            .into_iter()
            .map(|(id, _, _)| id)
            .collect();

        for expected in ["gain", "bank", "delay", "pingpong", "feedback", "dry", "wet"] {
            assert!(ids.iter().any(|id| id == expected), "missing {expected}");
        }
        assert_eq!(ids.len(), 7);
    }
}
