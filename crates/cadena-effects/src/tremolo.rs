//! LFO amplitude modulation.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{Effect, EffectKind, FloatParam, Lfo, Param, ParamUnit, SettingsBank};

/// Parameters for [`Tremolo`].
#[derive(Debug)]
pub struct TremoloSettings {
    /// LFO rate in Hz.
    pub rate_hz: FloatParam,
    /// Modulation depth in percent.
    pub depth: FloatParam,
}

impl Default for TremoloSettings {
    fn default() -> Self {
        Self {
            rate_hz: FloatParam::new("Rate", 5.0, 0.1, 20.0, ParamUnit::Hertz),
            depth: FloatParam::new("Depth", 80.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for TremoloSettings {
    fn effect_name(&self) -> &'static str {
        "Tremolo"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.rate_hz, &self.depth]
    }
}

/// Periodic volume modulation: gain dips from 1 down to `1 - depth` and
/// back, once per LFO cycle. The gain is computed once per frame so every
/// channel pulses together.
#[derive(Debug)]
pub struct Tremolo {
    settings: Arc<TremoloSettings>,
    enabled: bool,
    lfo: Lfo,
}

impl Tremolo {
    /// Create a tremolo.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(TremoloSettings::default()),
            enabled: true,
            lfo: Lfo::new(sample_rate, 5.0),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &TremoloSettings {
        &self.settings
    }
}

impl Effect for Tremolo {
    fn kind(&self) -> EffectKind {
        EffectKind::Tremolo
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
        let depth = self.settings.depth.get() / 100.0;
        if depth <= 0.001 {
            return;
        }
        self.lfo.set_frequency(self.settings.rate_hz.get());

        for frame in buffer.chunks_exact_mut(channels) {
            let gain = 1.0 - depth * self.lfo.next_unipolar();
            for sample in frame.iter_mut() {
                *sample *= gain;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.lfo.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_depth_is_identity() {
        let mut trem = Tremolo::new(48000.0);
        trem.settings().depth.set(0.0);
        let mut buffer = [0.5f32; 64];
        let original = buffer;
        trem.process(&mut buffer, 2);
        assert_eq!(&buffer[..], &original[..]);
    }

    #[test]
    fn modulates_amplitude_over_time() {
        let mut trem = Tremolo::new(48000.0);
        trem.settings().rate_hz.set(10.0);
        trem.settings().depth.set(100.0);
        let mut buffer = [1.0f32; 9600]; // 200 ms of DC, two LFO cycles
        trem.process(&mut buffer, 1);

        let min = buffer.iter().fold(1.0f32, |m, s| m.min(*s));
        let max = buffer.iter().fold(0.0f32, |m, s| m.max(*s));
        assert!(min < 0.05, "trough should approach 0, got {min}");
        assert!(max > 0.95, "crest should approach 1, got {max}");
    }

    #[test]
    fn channels_pulse_together() {
        let mut trem = Tremolo::new(48000.0);
        trem.settings().depth.set(100.0);
        let mut buffer = [1.0f32; 512];
        trem.process(&mut buffer, 2);
        for frame in buffer.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }
}
