//! Stereo-linked peak limiter.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank, db_to_linear,
};
use libm::expf;

/// Parameters for [`Limiter`].
#[derive(Debug)]
pub struct LimiterSettings {
    /// Ceiling threshold in dB.
    pub threshold_db: FloatParam,
    /// Release time in milliseconds.
    pub release_ms: FloatParam,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            threshold_db: FloatParam::new("Threshold", -6.0, -30.0, 0.0, ParamUnit::Decibels),
            release_ms: FloatParam::new("Release", 100.0, 10.0, 500.0, ParamUnit::Milliseconds),
        }
    }
}

impl SettingsBank for LimiterSettings {
    fn effect_name(&self) -> &'static str {
        "Limiter"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.threshold_db, &self.release_ms]
    }
}

/// Hard ceiling with instant attack and exponential release.
///
/// The detector takes the **maximum absolute sample across all channels of
/// a frame** and every channel in that frame receives the same scalar gain.
/// Unlinked limiting would yank loud transients toward the quiet side and
/// smear the stereo image; linking trades a little loudness for a stable
/// image.
#[derive(Debug)]
pub struct Limiter {
    settings: Arc<LimiterSettings>,
    enabled: bool,
    sample_rate: f32,
    /// Peak envelope: rises instantly, falls by the release coefficient.
    envelope: f32,
    release_coeff: f32,
    last_release_ms: f32,
}

impl Limiter {
    /// Create a limiter.
    pub fn new(sample_rate: f32) -> Self {
        let mut limiter = Self {
            settings: Arc::new(LimiterSettings::default()),
            enabled: true,
            sample_rate,
            envelope: 0.0,
            release_coeff: 0.0,
            last_release_ms: f32::NAN,
        };
        limiter.refresh_release(100.0);
        limiter
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &LimiterSettings {
        &self.settings
    }

    fn refresh_release(&mut self, release_ms: f32) {
        self.release_coeff = expf(-1.0 / (release_ms * self.sample_rate / 1000.0));
        self.last_release_ms = release_ms;
    }
}

impl Effect for Limiter {
    fn kind(&self) -> EffectKind {
        EffectKind::Limiter
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
        let release_ms = self.settings.release_ms.get();
        if release_ms != self.last_release_ms {
            self.refresh_release(release_ms);
        }

        for frame in buffer.chunks_exact_mut(channels) {
            // Stereo link: one peak per frame across every channel
            let mut peak = 0.0f32;
            for sample in frame.iter() {
                let level = sample.abs();
                if level > peak {
                    peak = level;
                }
            }

            // Instant attack, exponential release
            if peak > self.envelope {
                self.envelope = peak;
            } else {
                self.envelope = self.release_coeff * self.envelope
                    + (1.0 - self.release_coeff) * peak;
            }

            let gain = if self.envelope > threshold && self.envelope > 1e-9 {
                threshold / self.envelope
            } else {
                1.0
            };

            // The same scalar gain lands on every channel of the frame
            for sample in frame.iter_mut() {
                *sample *= gain;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.last_release_ms = f32::NAN;
    }

    fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_signal_passes_untouched() {
        let mut limiter = Limiter::new(48000.0);
        limiter.settings().threshold_db.set(-6.0);
        let quiet = db_to_linear(-30.0);
        let mut buffer = [quiet; 64];
        limiter.process(&mut buffer, 2);
        assert!(buffer.iter().all(|s| (s - quiet).abs() < 1e-6));
    }

    #[test]
    fn output_never_exceeds_threshold() {
        let mut limiter = Limiter::new(48000.0);
        limiter.settings().threshold_db.set(-6.0);
        let ceiling = db_to_linear(-6.0);
        let mut buffer = [1.0f32; 4800];
        limiter.process(&mut buffer, 1);
        assert!(
            buffer.iter().all(|s| s.abs() <= ceiling + 1e-5),
            "peaks must not pass the ceiling"
        );
    }

    #[test]
    fn channels_receive_identical_gain() {
        let mut limiter = Limiter::new(48000.0);
        limiter.settings().threshold_db.set(-6.0206); // linear 0.5

        // Channel 0 loud, channel 1 quiet - one interleaved frame
        let mut buffer = [1.0f32, 0.1];
        limiter.process(&mut buffer, 2);

        // Frame peak is 1.0 -> gain 0.5 on both channels
        assert!((buffer[0] - 0.5).abs() < 1e-3, "ch0 {}", buffer[0]);
        assert!((buffer[1] - 0.05).abs() < 1e-3, "ch1 {}", buffer[1]);
        // Both channels attenuated by the same fraction
        let g0 = buffer[0] / 1.0;
        let g1 = buffer[1] / 0.1;
        assert!((g0 - g1).abs() < 1e-5, "gains differ: {g0} vs {g1}");
    }

    #[test]
    fn gain_recovers_after_transient() {
        let mut limiter = Limiter::new(48000.0);
        limiter.settings().threshold_db.set(-6.0);
        limiter.settings().release_ms.set(10.0);

        // Loud burst then quiet signal
        let mut buffer = vec![1.0f32; 480];
        buffer.extend(vec![0.1f32; 24000]);
        limiter.process(&mut buffer, 1);

        // Long after the burst, the quiet signal passes at full level again
        let tail = buffer[buffer.len() - 1];
        assert!((tail - 0.1).abs() < 0.005, "gain should recover, got {tail}");
    }
}
