//! Carrier-oscillator ring modulator.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank, wet_dry_mix};
use libm::sinf;

/// Parameters for [`RingModulator`].
#[derive(Debug)]
pub struct RingModulatorSettings {
    /// Carrier frequency in Hz.
    pub carrier_hz: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for RingModulatorSettings {
    fn default() -> Self {
        Self {
            carrier_hz: FloatParam::new("Carrier", 440.0, 20.0, 5000.0, ParamUnit::Hertz),
            wet: FloatParam::new("Wet", 100.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for RingModulatorSettings {
    fn effect_name(&self) -> &'static str {
        "Ring Modulator"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.carrier_hz, &self.wet]
    }
}

/// Multiplies the input by a sine carrier, producing sum and difference
/// frequencies (the metallic "robot voice" spectrum). The carrier phase
/// advances once per frame so all channels share one carrier.
#[derive(Debug)]
pub struct RingModulator {
    settings: Arc<RingModulatorSettings>,
    enabled: bool,
    sample_rate: f32,
    phase: f32,
}

impl RingModulator {
    /// Create a ring modulator.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(RingModulatorSettings::default()),
            enabled: true,
            sample_rate,
            phase: 0.0,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &RingModulatorSettings {
        &self.settings
    }
}

impl Effect for RingModulator {
    fn kind(&self) -> EffectKind {
        EffectKind::RingModulator
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
        let wet = self.settings.wet.get() / 100.0;
        if wet <= 0.001 {
            return;
        }
        let phase_inc = self.settings.carrier_hz.get() / self.sample_rate;

        for frame in buffer.chunks_exact_mut(channels) {
            let carrier = sinf(self.phase * core::f32::consts::TAU);
            self.phase += phase_inc;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
            for sample in frame.iter_mut() {
                let dry = *sample;
                *sample = wet_dry_mix(dry, dry * carrier, wet);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_zero_is_identity() {
        let mut ring = RingModulator::new(48000.0);
        ring.settings().wet.set(0.0);
        let mut buffer = [0.5f32; 32];
        let original = buffer;
        ring.process(&mut buffer, 2);
        assert_eq!(&buffer[..], &original[..]);
    }

    #[test]
    fn dc_input_becomes_carrier() {
        // Ring modulating DC by a sine yields the sine itself.
        let mut ring = RingModulator::new(48000.0);
        ring.settings().carrier_hz.set(1000.0);
        let mut buffer = [1.0f32; 4800];
        ring.process(&mut buffer, 1);

        let min = buffer.iter().fold(0.0f32, |m, s| m.min(*s));
        let max = buffer.iter().fold(0.0f32, |m, s| m.max(*s));
        assert!(max > 0.95 && min < -0.95, "min {min}, max {max}");
    }

    #[test]
    fn output_bounded_by_input_peak() {
        let mut ring = RingModulator::new(48000.0);
        let mut buffer: Vec<f32> = (0..4096)
            .map(|i| libm::sinf(core::f32::consts::TAU * 330.0 * i as f32 / 48000.0) * 0.7)
            .collect();
        ring.process(&mut buffer, 1);
        assert!(buffer.iter().all(|s| s.abs() <= 0.7 + 1e-6));
    }
}
