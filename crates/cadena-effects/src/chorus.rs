//! Modulated-delay chorus.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    DelayLine, Effect, EffectKind, FloatParam, Lfo, Param, ParamUnit, SettingsBank, wet_dry_mix,
};

/// Center of the modulated delay in milliseconds.
const BASE_DELAY_MS: f32 = 20.0;
/// Maximum sweep on either side of the center at 100% depth.
const SWEEP_MS: f32 = 8.0;
/// Buffer headroom beyond the deepest sweep.
const MAX_DELAY_MS: f32 = 40.0;

/// Parameters for [`Chorus`].
#[derive(Debug)]
pub struct ChorusSettings {
    /// LFO rate in Hz.
    pub rate_hz: FloatParam,
    /// Sweep depth in percent.
    pub depth: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for ChorusSettings {
    fn default() -> Self {
        Self {
            rate_hz: FloatParam::new("Rate", 0.8, 0.05, 5.0, ParamUnit::Hertz),
            depth: FloatParam::new("Depth", 50.0, 0.0, 100.0, ParamUnit::Percent),
            wet: FloatParam::new("Wet", 50.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for ChorusSettings {
    fn effect_name(&self) -> &'static str {
        "Chorus"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.rate_hz, &self.depth, &self.wet]
    }
}

/// Classic chorus: the input is blended with a copy read from a fractional
/// delay line whose tap position sweeps around 20 ms under LFO control.
///
/// The LFO advances once per frame; every channel reads the same sweep but
/// through its own delay line. At wet = 0 the effect early-returns and the
/// buffer is bit-identical to the input.
#[derive(Debug)]
pub struct Chorus {
    settings: Arc<ChorusSettings>,
    enabled: bool,
    sample_rate: f32,
    lfo: Lfo,
    lines: Vec<DelayLine>,
}

impl Chorus {
    /// Create a chorus.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(ChorusSettings::default()),
            enabled: true,
            sample_rate,
            lfo: Lfo::new(sample_rate, 0.8),
            lines: Vec::new(),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &ChorusSettings {
        &self.settings
    }

    fn ensure_channels(&mut self, channels: usize) {
        while self.lines.len() < channels {
            self.lines.push(DelayLine::from_seconds(
                self.sample_rate,
                MAX_DELAY_MS / 1000.0,
            ));
        }
    }
}

impl Effect for Chorus {
    fn kind(&self) -> EffectKind {
        EffectKind::Chorus
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
        let depth = self.settings.depth.get() / 100.0;
        self.lfo.set_frequency(self.settings.rate_hz.get());
        self.ensure_channels(channels);

        let ms_to_samples = self.sample_rate / 1000.0;
        let base = BASE_DELAY_MS * ms_to_samples;
        let sweep = SWEEP_MS * depth * ms_to_samples;

        for frame in buffer.chunks_exact_mut(channels) {
            let delay_samples = base + self.lfo.next() * sweep;
            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let line = &mut self.lines[ch];
                line.write(dry);
                let delayed = line.read(delay_samples);
                *sample = wet_dry_mix(dry, delayed, wet);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
        let channels = self.lines.len();
        self.lines.clear();
        self.ensure_channels(channels);
    }

    fn reset(&mut self) {
        self.lfo.reset();
        for line in &mut self.lines {
            line.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| libm::sinf(core::f32::consts::TAU * 440.0 * i as f32 / 48000.0))
            .collect()
    }

    #[test]
    fn wet_zero_is_exact_identity() {
        let mut chorus = Chorus::new(48000.0);
        chorus.settings().wet.set(0.0);
        let mut buffer = sine(4096);
        let original = buffer.clone();
        chorus.process(&mut buffer, 2);
        assert_eq!(buffer, original);
    }

    #[test]
    fn wet_signal_differs_from_dry() {
        let mut chorus = Chorus::new(48000.0);
        chorus.settings().wet.set(50.0);
        let mut buffer = sine(4096);
        let original = buffer.clone();
        chorus.process(&mut buffer, 1);
        let diff: f32 = buffer
            .iter()
            .zip(&original)
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(diff > 1.0, "modulated output should differ, diff {diff}");
    }

    #[test]
    fn output_is_bounded_for_bounded_input() {
        let mut chorus = Chorus::new(48000.0);
        chorus.settings().depth.set(100.0);
        chorus.settings().wet.set(100.0);
        let mut buffer = sine(8192);
        chorus.process(&mut buffer, 2);
        assert!(buffer.iter().all(|s| s.abs() <= 1.01));
    }

    #[test]
    fn survives_channel_count_changes() {
        let mut chorus = Chorus::new(48000.0);
        let mut mono = sine(512);
        chorus.process(&mut mono, 1);
        let mut eight = sine(1024);
        chorus.process(&mut eight, 8);
        assert!(eight.iter().all(|s| s.is_finite()));
    }
}
