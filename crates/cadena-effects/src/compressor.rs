//! Downward compressor.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, EnvelopeFollower, FloatParam, Param, ParamUnit, SettingsBank,
    db_to_linear, grow_channels, linear_to_db,
};

/// Parameters for [`Compressor`].
#[derive(Debug)]
pub struct CompressorSettings {
    /// Threshold in dB.
    pub threshold_db: FloatParam,
    /// Compression ratio (n:1).
    pub ratio: FloatParam,
    /// Attack time in milliseconds.
    pub attack_ms: FloatParam,
    /// Release time in milliseconds.
    pub release_ms: FloatParam,
    /// Makeup gain in dB.
    pub makeup_db: FloatParam,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold_db: FloatParam::new("Threshold", -20.0, -60.0, 0.0, ParamUnit::Decibels),
            ratio: FloatParam::new("Ratio", 4.0, 1.0, 20.0, ParamUnit::Ratio),
            attack_ms: FloatParam::new("Attack", 10.0, 0.1, 100.0, ParamUnit::Milliseconds),
            release_ms: FloatParam::new("Release", 100.0, 10.0, 1000.0, ParamUnit::Milliseconds),
            makeup_db: FloatParam::new("Makeup", 0.0, 0.0, 24.0, ParamUnit::Decibels),
        }
    }
}

impl SettingsBank for CompressorSettings {
    fn effect_name(&self) -> &'static str {
        "Compressor"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![
            &self.threshold_db,
            &self.ratio,
            &self.attack_ms,
            &self.release_ms,
            &self.makeup_db,
        ]
    }
}

/// Per-channel detector.
#[derive(Debug, Clone)]
struct CompChannel {
    env: EnvelopeFollower,
}

impl Default for CompChannel {
    fn default() -> Self {
        Self {
            env: EnvelopeFollower::new(48000.0, 10.0, 100.0),
        }
    }
}

/// Feed-forward downward compressor.
///
/// Each channel runs its own envelope follower; when the detected level
/// exceeds the threshold, the overshoot is divided by the ratio and the
/// difference applied as gain reduction, then makeup gain is added back.
#[derive(Debug)]
pub struct Compressor {
    settings: Arc<CompressorSettings>,
    enabled: bool,
    sample_rate: f32,
    channels: Vec<CompChannel>,
    last_times: (f32, f32),
}

impl Compressor {
    /// Create a compressor.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(CompressorSettings::default()),
            enabled: true,
            sample_rate,
            channels: Vec::new(),
            last_times: (f32::NAN, f32::NAN),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &CompressorSettings {
        &self.settings
    }
}

impl Effect for Compressor {
    fn kind(&self) -> EffectKind {
        EffectKind::Compressor
    }

    fn settings(&self) -> Arc<dyn SettingsBank> {
        self.settings.clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.reset();
    }

    fn process(&mut self, buffer: &mut [f32], channels: usize) {
        if !self.enabled || channels == 0 {
            return;
        }
        let ratio = self.settings.ratio.get();
        if ratio <= 1.001 {
            return;
        }
        let threshold_db = self.settings.threshold_db.get();
        let makeup = db_to_linear(self.settings.makeup_db.get());
        let times = (
            self.settings.attack_ms.get(),
            self.settings.release_ms.get(),
        );

        let had_channels = self.channels.len();
        grow_channels(&mut self.channels, channels);
        if self.channels.len() != had_channels {
            // Freshly grown detectors need their coefficients installed
            self.last_times = (f32::NAN, f32::NAN);
        }
        if times != self.last_times {
            for state in &mut self.channels {
                state.env.set_sample_rate(self.sample_rate);
                state.env.set_attack_ms(times.0);
                state.env.set_release_ms(times.1);
            }
            self.last_times = times;
        }

        let slope = 1.0 - 1.0 / ratio;
        for frame in buffer.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let level = self.channels[ch].env.process(*sample);
                let level_db = linear_to_db(level);
                let over_db = level_db - threshold_db;
                let gain = if over_db > 0.0 {
                    db_to_linear(-over_db * slope)
                } else {
                    1.0
                };
                *sample *= gain * makeup;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.last_times = (f32::NAN, f32::NAN);
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            state.env.reset();
        }
    }
}
