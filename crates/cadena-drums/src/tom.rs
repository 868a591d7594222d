//! Synthesized tom.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    BoolParam, Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank,
};
use libm::sinf;

use crate::voice::DecayEnvelope;

/// Parameters for [`TomDrum`].
#[derive(Debug)]
pub struct TomDrumSettings {
    /// Fundamental frequency in Hz.
    pub freq_hz: FloatParam,
    /// Pitch sweep amount in percent.
    pub sweep: FloatParam,
    /// Amplitude decay in milliseconds.
    pub decay_ms: FloatParam,
    /// Output level in percent.
    pub level: FloatParam,
    /// Hit velocity in percent.
    pub velocity: FloatParam,
    /// One-shot trigger; the voice consumes it.
    pub trigger: BoolParam,
}

impl Default for TomDrumSettings {
    fn default() -> Self {
        Self {
            freq_hz: FloatParam::new("Frequency", 120.0, 80.0, 300.0, ParamUnit::Hertz),
            sweep: FloatParam::new("Sweep", 40.0, 0.0, 100.0, ParamUnit::Percent),
            decay_ms: FloatParam::new("Decay", 350.0, 100.0, 800.0, ParamUnit::Milliseconds),
            level: FloatParam::new("Level", 80.0, 0.0, 100.0, ParamUnit::Percent),
            velocity: FloatParam::new("Velocity", 100.0, 0.0, 100.0, ParamUnit::Percent),
            trigger: BoolParam::new("Trigger", false),
        }
    }
}

impl SettingsBank for TomDrumSettings {
    fn effect_name(&self) -> &'static str {
        "Tom"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![
            &self.freq_hz,
            &self.sweep,
            &self.decay_ms,
            &self.level,
            &self.velocity,
            &self.trigger,
        ]
    }
}

/// Pitched tom voice - the kick topology an octave or two up, with a
/// gentler sweep and a singing decay.
#[derive(Debug)]
pub struct TomDrum {
    settings: Arc<TomDrumSettings>,
    enabled: bool,
    sample_rate: f32,
    phase: f32,
    amp_env: DecayEnvelope,
    pitch_env: DecayEnvelope,
    velocity: f32,
}

impl TomDrum {
    /// Create a silent tom voice.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(TomDrumSettings::default()),
            enabled: true,
            sample_rate,
            phase: 0.0,
            amp_env: DecayEnvelope::new(sample_rate, 0.35),
            pitch_env: DecayEnvelope::new(sample_rate, 0.07),
            velocity: 1.0,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &TomDrumSettings {
        &self.settings
    }

    fn fire(&mut self) {
        let decay_s = self.settings.decay_ms.get() / 1000.0;
        self.amp_env.set_decay(self.sample_rate, decay_s);
        self.pitch_env.set_decay(self.sample_rate, decay_s * 0.2);
        self.amp_env.trigger();
        self.pitch_env.trigger();
        self.phase = 0.0;
        self.velocity = self.settings.velocity.get() / 100.0;
    }
}

impl Effect for TomDrum {
    fn kind(&self) -> EffectKind {
        EffectKind::TomDrum
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
        let level = self.settings.level.get() / 100.0;
        if level <= 0.001 {
            return;
        }
        if self.settings.trigger.take() {
            self.fire();
        }
        if !self.amp_env.active() {
            return;
        }

        let base_freq = self.settings.freq_hz.get();
        let sweep = self.settings.sweep.get() / 100.0;

        for frame in buffer.chunks_exact_mut(channels) {
            let amp = self.amp_env.next();
            if amp == 0.0 {
                break;
            }
            let freq = base_freq * (1.0 + 1.5 * sweep * self.pitch_env.next());
            self.phase += freq / self.sample_rate;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
            let voice = sinf(self.phase * core::f32::consts::TAU) * amp * self.velocity * level;
            for sample in frame.iter_mut() {
                *sample += voice;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.amp_env.reset();
        self.pitch_env.reset();
        self.phase = 0.0;
    }
}
