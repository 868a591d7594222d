//! Synthesized snare drum.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    BoolParam, Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank,
};
use libm::sinf;

use crate::voice::{DecayEnvelope, NoiseSource};

/// Parameters for [`SnareDrum`].
#[derive(Debug)]
pub struct SnareDrumSettings {
    /// Shell tone frequency in Hz.
    pub tone_hz: FloatParam,
    /// Amplitude decay in milliseconds.
    pub decay_ms: FloatParam,
    /// Wire-noise blend in percent (0 = all shell, 100 = all wires).
    pub snap: FloatParam,
    /// Output level in percent.
    pub level: FloatParam,
    /// Hit velocity in percent.
    pub velocity: FloatParam,
    /// One-shot trigger; the voice consumes it.
    pub trigger: BoolParam,
}

impl Default for SnareDrumSettings {
    fn default() -> Self {
        Self {
            tone_hz: FloatParam::new("Tone", 180.0, 100.0, 400.0, ParamUnit::Hertz),
            decay_ms: FloatParam::new("Decay", 150.0, 50.0, 500.0, ParamUnit::Milliseconds),
            snap: FloatParam::new("Snap", 60.0, 0.0, 100.0, ParamUnit::Percent),
            level: FloatParam::new("Level", 80.0, 0.0, 100.0, ParamUnit::Percent),
            velocity: FloatParam::new("Velocity", 100.0, 0.0, 100.0, ParamUnit::Percent),
            trigger: BoolParam::new("Trigger", false),
        }
    }
}

impl SettingsBank for SnareDrumSettings {
    fn effect_name(&self) -> &'static str {
        "Snare Drum"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![
            &self.tone_hz,
            &self.decay_ms,
            &self.snap,
            &self.level,
            &self.velocity,
            &self.trigger,
        ]
    }
}

/// Shell tone plus wire noise.
///
/// Two decaying layers: a sine at the shell frequency and a white-noise
/// burst with a slightly faster envelope, blended by the snap knob. Mono
/// output added to every channel per frame.
#[derive(Debug)]
pub struct SnareDrum {
    settings: Arc<SnareDrumSettings>,
    enabled: bool,
    sample_rate: f32,
    phase: f32,
    tone_env: DecayEnvelope,
    noise_env: DecayEnvelope,
    noise: NoiseSource,
    velocity: f32,
}

impl SnareDrum {
    /// Create a silent snare voice.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(SnareDrumSettings::default()),
            enabled: true,
            sample_rate,
            phase: 0.0,
            tone_env: DecayEnvelope::new(sample_rate, 0.15),
            noise_env: DecayEnvelope::new(sample_rate, 0.12),
            noise: NoiseSource::default(),
            velocity: 1.0,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &SnareDrumSettings {
        &self.settings
    }

    fn fire(&mut self) {
        let decay_s = self.settings.decay_ms.get() / 1000.0;
        self.tone_env.set_decay(self.sample_rate, decay_s);
        self.noise_env.set_decay(self.sample_rate, decay_s * 0.8);
        self.tone_env.trigger();
        self.noise_env.trigger();
        self.phase = 0.0;
        self.velocity = self.settings.velocity.get() / 100.0;
    }

    fn active(&self) -> bool {
        self.tone_env.active() || self.noise_env.active()
    }
}

impl Effect for SnareDrum {
    fn kind(&self) -> EffectKind {
        EffectKind::SnareDrum
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
        if !self.active() {
            return;
        }

        let tone_hz = self.settings.tone_hz.get();
        let snap = self.settings.snap.get() / 100.0;
        let phase_inc = tone_hz / self.sample_rate;

        for frame in buffer.chunks_exact_mut(channels) {
            let tone_amp = self.tone_env.next();
            let noise_amp = self.noise_env.next();
            if tone_amp == 0.0 && noise_amp == 0.0 {
                break;
            }
            self.phase += phase_inc;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
            let shell = sinf(self.phase * core::f32::consts::TAU) * tone_amp;
            let wires = self.noise.next() * noise_amp;
            let voice = (shell * (1.0 - snap) + wires * snap) * self.velocity * level;

            for sample in frame.iter_mut() {
                *sample += voice;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.tone_env.reset();
        self.noise_env.reset();
        self.noise.reset();
        self.phase = 0.0;
    }
}
