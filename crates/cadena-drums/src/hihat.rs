//! Synthesized hi-hat.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    BoolParam, Effect, EffectKind, FloatParam, OnePoleHp, Param, ParamUnit, SettingsBank,
};

use crate::voice::{DecayEnvelope, NoiseSource};

/// Parameters for [`HiHat`].
#[derive(Debug)]
pub struct HiHatSettings {
    /// Highpass corner in Hz - higher is thinner/brighter.
    pub brightness_hz: FloatParam,
    /// Amplitude decay in milliseconds (short = closed, long = open).
    pub decay_ms: FloatParam,
    /// Output level in percent.
    pub level: FloatParam,
    /// Hit velocity in percent.
    pub velocity: FloatParam,
    /// One-shot trigger; the voice consumes it.
    pub trigger: BoolParam,
}

impl Default for HiHatSettings {
    fn default() -> Self {
        Self {
            brightness_hz: FloatParam::new("Brightness", 6000.0, 2000.0, 12000.0, ParamUnit::Hertz),
            decay_ms: FloatParam::new("Decay", 80.0, 20.0, 600.0, ParamUnit::Milliseconds),
            level: FloatParam::new("Level", 70.0, 0.0, 100.0, ParamUnit::Percent),
            velocity: FloatParam::new("Velocity", 100.0, 0.0, 100.0, ParamUnit::Percent),
            trigger: BoolParam::new("Trigger", false),
        }
    }
}

impl SettingsBank for HiHatSettings {
    fn effect_name(&self) -> &'static str {
        "Hi-Hat"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![
            &self.brightness_hz,
            &self.decay_ms,
            &self.level,
            &self.velocity,
            &self.trigger,
        ]
    }
}

/// Filtered noise burst: white noise through a one-pole highpass under a
/// short exponential envelope. The decay knob covers closed ticks through
/// open washes.
#[derive(Debug)]
pub struct HiHat {
    settings: Arc<HiHatSettings>,
    enabled: bool,
    sample_rate: f32,
    env: DecayEnvelope,
    noise: NoiseSource,
    hp: OnePoleHp,
    velocity: f32,
}

impl HiHat {
    /// Create a silent hi-hat voice.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(HiHatSettings::default()),
            enabled: true,
            sample_rate,
            env: DecayEnvelope::new(sample_rate, 0.08),
            noise: NoiseSource::default(),
            hp: OnePoleHp::new(sample_rate, 6000.0),
            velocity: 1.0,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &HiHatSettings {
        &self.settings
    }

    fn fire(&mut self) {
        self.env
            .set_decay(self.sample_rate, self.settings.decay_ms.get() / 1000.0);
        self.hp
            .set_cutoff(self.sample_rate, self.settings.brightness_hz.get());
        self.env.trigger();
        self.velocity = self.settings.velocity.get() / 100.0;
    }
}

impl Effect for HiHat {
    fn kind(&self) -> EffectKind {
        EffectKind::HiHat
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
        if !self.env.active() {
            return;
        }

        for frame in buffer.chunks_exact_mut(channels) {
            let amp = self.env.next();
            if amp == 0.0 {
                break;
            }
            let voice = self.hp.process(self.noise.next()) * amp * self.velocity * level;
            for sample in frame.iter_mut() {
                *sample += voice;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.env.reset();
        self.noise.reset();
        self.hp.reset();
    }
}
