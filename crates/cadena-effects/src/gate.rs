//! Noise gate.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, OnePoleLp, Param, ParamUnit, SettingsBank, db_to_linear,
};
use libm::expf;

/// Detector smoothing lowpass cutoff in Hz.
const DETECTOR_LP_HZ: f32 = 10.0;

/// Parameters for [`NoiseGate`].
#[derive(Debug)]
pub struct NoiseGateSettings {
    /// Open threshold in dB.
    pub threshold_db: FloatParam,
    /// Gate opening time in milliseconds.
    pub attack_ms: FloatParam,
    /// Gate closing time in milliseconds.
    pub release_ms: FloatParam,
}

impl Default for NoiseGateSettings {
    fn default() -> Self {
        Self {
            threshold_db: FloatParam::new("Threshold", -50.0, -80.0, 0.0, ParamUnit::Decibels),
            attack_ms: FloatParam::new("Attack", 1.0, 0.1, 50.0, ParamUnit::Milliseconds),
            release_ms: FloatParam::new("Release", 100.0, 10.0, 1000.0, ParamUnit::Milliseconds),
        }
    }
}

impl SettingsBank for NoiseGateSettings {
    fn effect_name(&self) -> &'static str {
        "Noise Gate"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.threshold_db, &self.attack_ms, &self.release_ms]
    }
}

/// Downward expander with a smoothed mono detector.
///
/// The detector is the rectified frame average passed through a 10 Hz
/// one-pole lowpass - slow enough not to chatter on bass material. One
/// gain ramps toward open (1) or closed (0) with separate attack/release
/// coefficients and multiplies every channel.
#[derive(Debug)]
pub struct NoiseGate {
    settings: Arc<NoiseGateSettings>,
    enabled: bool,
    sample_rate: f32,
    detector: OnePoleLp,
    gain: f32,
    attack_coeff: f32,
    release_coeff: f32,
    last_times: (f32, f32),
}

impl NoiseGate {
    /// Create a gate.
    pub fn new(sample_rate: f32) -> Self {
        let mut gate = Self {
            settings: Arc::new(NoiseGateSettings::default()),
            enabled: true,
            sample_rate,
            detector: OnePoleLp::new(sample_rate, DETECTOR_LP_HZ),
            gain: 1.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            last_times: (f32::NAN, f32::NAN),
        };
        gate.refresh_times((1.0, 100.0));
        gate
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &NoiseGateSettings {
        &self.settings
    }

    fn refresh_times(&mut self, times: (f32, f32)) {
        self.attack_coeff = expf(-1.0 / (times.0 * self.sample_rate / 1000.0));
        self.release_coeff = expf(-1.0 / (times.1 * self.sample_rate / 1000.0));
        self.last_times = times;
    }
}

impl Effect for NoiseGate {
    fn kind(&self) -> EffectKind {
        EffectKind::NoiseGate
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
        let threshold = db_to_linear(self.settings.threshold_db.get());
        let times = (
            self.settings.attack_ms.get(),
            self.settings.release_ms.get(),
        );
        if times != self.last_times {
            self.refresh_times(times);
        }

        let inv_channels = 1.0 / channels as f32;
        for frame in buffer.chunks_exact_mut(channels) {
            let rectified = frame.iter().map(|s| s.abs()).sum::<f32>() * inv_channels;
            let level = self.detector.process(rectified);

            let target = if level > threshold { 1.0 } else { 0.0 };
            let coeff = if target > self.gain {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            self.gain = coeff * self.gain + (1.0 - coeff) * target;

            for sample in frame.iter_mut() {
                *sample *= self.gain;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.detector = OnePoleLp::new(sample_rate, DETECTOR_LP_HZ);
        self.last_times = (f32::NAN, f32::NAN);
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.gain = 1.0;
    }
}
