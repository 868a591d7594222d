//! Synthesized kick drum.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    BoolParam, Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank, soft_clip,
};
use libm::sinf;

use crate::voice::DecayEnvelope;

/// Parameters for [`KickDrum`].
#[derive(Debug)]
pub struct KickDrumSettings {
    /// Fundamental frequency in Hz.
    pub freq_hz: FloatParam,
    /// Pitch sweep amount in percent.
    pub sweep: FloatParam,
    /// Amplitude decay in milliseconds.
    pub decay_ms: FloatParam,
    /// Saturation drive in dB.
    pub drive_db: FloatParam,
    /// Output level in percent.
    pub level: FloatParam,
    /// Hit velocity in percent.
    pub velocity: FloatParam,
    /// One-shot trigger; the voice consumes it.
    pub trigger: BoolParam,
}

impl Default for KickDrumSettings {
    fn default() -> Self {
        Self {
            freq_hz: FloatParam::new("Frequency", 55.0, 30.0, 80.0, ParamUnit::Hertz),
            sweep: FloatParam::new("Sweep", 60.0, 0.0, 100.0, ParamUnit::Percent),
            decay_ms: FloatParam::new("Decay", 300.0, 50.0, 1000.0, ParamUnit::Milliseconds),
            drive_db: FloatParam::new("Drive", 6.0, 0.0, 24.0, ParamUnit::Decibels),
            level: FloatParam::new("Level", 80.0, 0.0, 100.0, ParamUnit::Percent),
            velocity: FloatParam::new("Velocity", 100.0, 0.0, 100.0, ParamUnit::Percent),
            trigger: BoolParam::new("Trigger", false),
        }
    }
}

impl SettingsBank for KickDrumSettings {
    fn effect_name(&self) -> &'static str {
        "Kick Drum"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![
            &self.freq_hz,
            &self.sweep,
            &self.decay_ms,
            &self.drive_db,
            &self.level,
            &self.velocity,
            &self.trigger,
        ]
    }
}

/// One-shot kick voice: a sine oscillator whose pitch sweeps down from an
/// initial boost while an exponential envelope closes over it.
///
/// Generates one mono sample per frame and **adds** it to every channel -
/// drums layer onto the buffer instead of transforming it.
#[derive(Debug)]
pub struct KickDrum {
    settings: Arc<KickDrumSettings>,
    enabled: bool,
    sample_rate: f32,
    phase: f32,
    amp_env: DecayEnvelope,
    pitch_env: DecayEnvelope,
    velocity: f32,
}

impl KickDrum {
    /// Create a silent kick voice.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(KickDrumSettings::default()),
            enabled: true,
            sample_rate,
            phase: 0.0,
            amp_env: DecayEnvelope::new(sample_rate, 0.3),
            pitch_env: DecayEnvelope::new(sample_rate, 0.045),
            velocity: 1.0,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &KickDrumSettings {
        &self.settings
    }

    fn fire(&mut self) {
        let decay_s = self.settings.decay_ms.get() / 1000.0;
        self.amp_env.set_decay(self.sample_rate, decay_s);
        // The pitch envelope is much faster than the body
        self.pitch_env.set_decay(self.sample_rate, decay_s * 0.15);
        self.amp_env.trigger();
        self.pitch_env.trigger();
        self.phase = 0.0;
        self.velocity = self.settings.velocity.get() / 100.0;
    }

    #[inline]
    fn next_sample(&mut self, base_freq: f32, sweep: f32, drive: f32, level: f32) -> f32 {
        let amp = self.amp_env.next();
        if amp == 0.0 {
            return 0.0;
        }
        // Frequency sweeps down from up to 4x the fundamental
        let freq = base_freq * (1.0 + 3.0 * sweep * self.pitch_env.next());
        self.phase += freq / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        let osc = sinf(self.phase * core::f32::consts::TAU);
        soft_clip(osc * drive) * amp * self.velocity * level
    }
}

impl Effect for KickDrum {
    fn kind(&self) -> EffectKind {
        EffectKind::KickDrum
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
        let drive = cadena_core::db_to_linear(self.settings.drive_db.get());

        for frame in buffer.chunks_exact_mut(channels) {
            let voice = self.next_sample(base_freq, sweep, drive, level);
            if voice == 0.0 && !self.amp_env.active() {
                break;
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_until_triggered() {
        let mut kick = KickDrum::new(48000.0);
        let mut buffer = vec![0.0f32; 512];
        kick.process(&mut buffer, 2);
        assert!(buffer.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn trigger_produces_sound_then_dies() {
        let mut kick = KickDrum::new(48000.0);
        kick.settings().decay_ms.set(50.0);
        kick.settings().trigger.set(true);

        let mut buffer = vec![0.0f32; 48000];
        kick.process(&mut buffer, 1);
        let early = buffer[..4800].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let late = buffer[40000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(early > 0.1, "voice should sound, got {early}");
        assert_eq!(late, 0.0, "voice should kill itself");
    }

    #[test]
    fn adds_identically_to_all_channels() {
        let mut kick = KickDrum::new(48000.0);
        kick.settings().trigger.set(true);

        // Pre-existing content differs per channel; the added voice is mono
        let mut buffer = vec![0.0f32; 256];
        for (i, s) in buffer.iter_mut().enumerate() {
            *s = if i % 2 == 0 { 0.25 } else { -0.25 };
        }
        kick.process(&mut buffer, 2);
        for frame in buffer.chunks_exact(2) {
            let added_l = frame[0] - 0.25;
            let added_r = frame[1] + 0.25;
            assert!((added_l - added_r).abs() < 1e-6);
        }
    }

    #[test]
    fn trigger_is_consumed() {
        let mut kick = KickDrum::new(48000.0);
        kick.settings().trigger.set(true);
        let mut buffer = vec![0.0f32; 64];
        kick.process(&mut buffer, 1);
        assert!(!kick.settings().trigger.get());
    }

    #[test]
    fn sweep_starts_high() {
        // With full sweep the early cycles are shorter than the late ones
        let mut kick = KickDrum::new(48000.0);
        kick.settings().sweep.set(100.0);
        kick.settings().decay_ms.set(1000.0);
        kick.settings().trigger.set(true);

        let mut buffer = vec![0.0f32; 48000];
        kick.process(&mut buffer, 1);

        let crossings = |window: &[f32]| {
            window
                .windows(2)
                .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                .count()
        };
        let early = crossings(&buffer[0..4800]);
        let late = crossings(&buffer[24000..28800]);
        assert!(early > late, "pitch should fall: early {early}, late {late}");
    }
}
