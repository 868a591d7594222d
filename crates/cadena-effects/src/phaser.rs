//! Four-stage allpass phaser.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, Lfo, Param, ParamUnit, SettingsBank, flush_denormal,
    grow_channels, lerp, wet_dry_mix,
};
use libm::tanf;

/// Low end of the allpass center sweep in Hz.
const SWEEP_MIN_HZ: f32 = 200.0;
/// High end of the allpass center sweep in Hz.
const SWEEP_MAX_HZ: f32 = 2000.0;
const STAGES: usize = 4;

/// Parameters for [`Phaser`].
#[derive(Debug)]
pub struct PhaserSettings {
    /// LFO rate in Hz.
    pub rate_hz: FloatParam,
    /// Sweep depth in percent.
    pub depth: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for PhaserSettings {
    fn default() -> Self {
        Self {
            rate_hz: FloatParam::new("Rate", 0.5, 0.05, 4.0, ParamUnit::Hertz),
            depth: FloatParam::new("Depth", 80.0, 0.0, 100.0, ParamUnit::Percent),
            wet: FloatParam::new("Wet", 50.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for PhaserSettings {
    fn effect_name(&self) -> &'static str {
        "Phaser"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.rate_hz, &self.depth, &self.wet]
    }
}

/// One first-order allpass section: `y[n] = c*x[n] + x[n-1] - c*y[n-1]`.
#[derive(Debug, Default, Clone, Copy)]
struct AllpassStage {
    x1: f32,
    y1: f32,
}

impl AllpassStage {
    #[inline]
    fn process(&mut self, input: f32, coeff: f32) -> f32 {
        let output = flush_denormal(coeff * input + self.x1 - coeff * self.y1);
        self.x1 = input;
        self.y1 = output;
        output
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// Per-channel allpass chain.
#[derive(Debug, Default, Clone)]
struct PhaserChannel {
    stages: [AllpassStage; STAGES],
}

/// Swept notches: four cascaded first-order allpasses whose corner
/// frequency rides the LFO, summed back against the dry signal.
#[derive(Debug)]
pub struct Phaser {
    settings: Arc<PhaserSettings>,
    enabled: bool,
    sample_rate: f32,
    lfo: Lfo,
    channels: Vec<PhaserChannel>,
}

impl Phaser {
    /// Create a phaser.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(PhaserSettings::default()),
            enabled: true,
            sample_rate,
            lfo: Lfo::new(sample_rate, 0.5),
            channels: Vec::new(),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &PhaserSettings {
        &self.settings
    }
}

impl Effect for Phaser {
    fn kind(&self) -> EffectKind {
        EffectKind::Phaser
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
        grow_channels(&mut self.channels, channels);

        for frame in buffer.chunks_exact_mut(channels) {
            // Sweep the allpass corner; depth narrows the excursion around
            // the low end of the range.
            let sweep = self.lfo.next_unipolar() * depth;
            let freq = lerp(SWEEP_MIN_HZ, SWEEP_MAX_HZ, sweep);
            let t = tanf(core::f32::consts::PI * freq / self.sample_rate);
            let coeff = (t - 1.0) / (t + 1.0);

            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let mut phased = dry;
                for stage in &mut self.channels[ch].stages {
                    phased = stage.process(phased, coeff);
                }
                // Summing dry and phased carves the notches
                let notched = (dry + phased) * 0.5;
                *sample = wet_dry_mix(dry, notched, wet);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.lfo.reset();
        for channel in &mut self.channels {
            for stage in &mut channel.stages {
                stage.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_zero_is_identity() {
        let mut phaser = Phaser::new(48000.0);
        phaser.settings().wet.set(0.0);
        let mut buffer = [0.3f32; 128];
        let original = buffer;
        phaser.process(&mut buffer, 2);
        assert_eq!(&buffer[..], &original[..]);
    }

    #[test]
    fn output_bounded_and_colored() {
        let mut phaser = Phaser::new(48000.0);
        phaser.settings().wet.set(100.0);
        let mut buffer: Vec<f32> = (0..16384)
            .map(|i| libm::sinf(core::f32::consts::TAU * 600.0 * i as f32 / 48000.0) * 0.8)
            .collect();
        let original = buffer.clone();
        phaser.process(&mut buffer, 1);
        assert!(buffer.iter().all(|s| s.abs() <= 1.2));
        assert_ne!(buffer, original);
    }

    #[test]
    fn allpass_preserves_magnitude_roughly() {
        // A static allpass passes total energy through; with the LFO at its
        // slowest, output RMS should be in the same ballpark as input RMS.
        let mut phaser = Phaser::new(48000.0);
        phaser.settings().rate_hz.set(0.05);
        phaser.settings().wet.set(100.0);
        let input: Vec<f32> = (0..8192)
            .map(|i| libm::sinf(core::f32::consts::TAU * 300.0 * i as f32 / 48000.0) * 0.5)
            .collect();
        let mut buffer = input.clone();
        phaser.process(&mut buffer, 1);
        let rms = |b: &[f32]| {
            libm::sqrtf(b.iter().map(|s| s * s).sum::<f32>() / b.len() as f32)
        };
        let ratio = rms(&buffer) / rms(&input);
        assert!(ratio > 0.1 && ratio < 1.5, "RMS ratio {ratio}");
    }
}
