//! Synthesized cymbal.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    BoolParam, Effect, EffectKind, FloatParam, OnePoleHp, Param, ParamUnit, SettingsBank,
};

use crate::voice::{DecayEnvelope, NoiseSource};

/// Inharmonic partial ratios (classic six-oscillator metal stack).
const PARTIAL_RATIOS: [f32; 6] = [1.0, 1.342, 1.2312, 1.6532, 1.9523, 2.1523];

/// Parameters for [`Cymbal`].
#[derive(Debug)]
pub struct CymbalSettings {
    /// Base partial frequency in Hz.
    pub freq_hz: FloatParam,
    /// Amplitude decay in milliseconds.
    pub decay_ms: FloatParam,
    /// Metallic-partials vs noise blend in percent.
    pub metal: FloatParam,
    /// Output level in percent.
    pub level: FloatParam,
    /// Hit velocity in percent.
    pub velocity: FloatParam,
    /// One-shot trigger; the voice consumes it.
    pub trigger: BoolParam,
}

impl Default for CymbalSettings {
    fn default() -> Self {
        Self {
            freq_hz: FloatParam::new("Frequency", 400.0, 200.0, 800.0, ParamUnit::Hertz),
            decay_ms: FloatParam::new("Decay", 900.0, 200.0, 2000.0, ParamUnit::Milliseconds),
            metal: FloatParam::new("Metal", 70.0, 0.0, 100.0, ParamUnit::Percent),
            level: FloatParam::new("Level", 60.0, 0.0, 100.0, ParamUnit::Percent),
            velocity: FloatParam::new("Velocity", 100.0, 0.0, 100.0, ParamUnit::Percent),
            trigger: BoolParam::new("Trigger", false),
        }
    }
}

impl SettingsBank for CymbalSettings {
    fn effect_name(&self) -> &'static str {
        "Cymbal"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![
            &self.freq_hz,
            &self.decay_ms,
            &self.metal,
            &self.level,
            &self.velocity,
            &self.trigger,
        ]
    }
}

/// Metallic crash: six detuned square partials at inharmonic ratios
/// blended with white noise, highpassed, under a long exponential decay.
#[derive(Debug)]
pub struct Cymbal {
    settings: Arc<CymbalSettings>,
    enabled: bool,
    sample_rate: f32,
    phases: [f32; 6],
    env: DecayEnvelope,
    noise: NoiseSource,
    hp: OnePoleHp,
    velocity: f32,
}

impl Cymbal {
    /// Create a silent cymbal voice.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(CymbalSettings::default()),
            enabled: true,
            sample_rate,
            phases: [0.0; 6],
            env: DecayEnvelope::new(sample_rate, 0.9),
            noise: NoiseSource::default(),
            hp: OnePoleHp::new(sample_rate, 3000.0),
            velocity: 1.0,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &CymbalSettings {
        &self.settings
    }

    fn fire(&mut self) {
        self.env
            .set_decay(self.sample_rate, self.settings.decay_ms.get() / 1000.0);
        self.env.trigger();
        self.phases = [0.0; 6];
        self.velocity = self.settings.velocity.get() / 100.0;
    }
}

impl Effect for Cymbal {
    fn kind(&self) -> EffectKind {
        EffectKind::Cymbal
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

        let base = self.settings.freq_hz.get();
        let metal = self.settings.metal.get() / 100.0;

        for frame in buffer.chunks_exact_mut(channels) {
            let amp = self.env.next();
            if amp == 0.0 {
                break;
            }
            // Square partial stack - sign of the phase ramp is enough
            let mut partials = 0.0;
            for (phase, ratio) in self.phases.iter_mut().zip(&PARTIAL_RATIOS) {
                *phase += base * ratio / self.sample_rate;
                if *phase >= 1.0 {
                    *phase -= 1.0;
                }
                partials += if *phase < 0.5 { 1.0 } else { -1.0 };
            }
            partials /= PARTIAL_RATIOS.len() as f32;

            let raw = partials * metal + self.noise.next() * (1.0 - metal);
            let voice = self.hp.process(raw) * amp * self.velocity * level;
            for sample in frame.iter_mut() {
                *sample += voice;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.hp = OnePoleHp::new(sample_rate, 3000.0);
    }

    fn reset(&mut self) {
        self.env.reset();
        self.noise.reset();
        self.hp.reset();
        self.phases = [0.0; 6];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_until_triggered() {
        let mut cymbal = Cymbal::new(48000.0);
        let mut buffer = vec![0.0f32; 256];
        cymbal.process(&mut buffer, 2);
        assert!(buffer.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn crash_rings_for_its_decay() {
        let mut cymbal = Cymbal::new(48000.0);
        cymbal.settings().decay_ms.set(2000.0);
        cymbal.settings().trigger.set(true);
        let mut buffer = vec![0.0f32; 48000];
        cymbal.process(&mut buffer, 1);
        // Still audible after 500 ms
        let late = buffer[24000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(late > 1e-3, "crash should still ring, got {late}");
    }

    #[test]
    fn output_is_bounded() {
        let mut cymbal = Cymbal::new(48000.0);
        cymbal.settings().trigger.set(true);
        let mut buffer = vec![0.0f32; 48000];
        cymbal.process(&mut buffer, 2);
        assert!(buffer.iter().all(|s| s.abs() <= 1.5));
    }
}
