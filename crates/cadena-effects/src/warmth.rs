//! Four-pole lowpass "warmth" rolloff.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, OnePoleLp, Param, ParamUnit, SettingsBank, grow_channels,
    lerp, wet_dry_mix,
};

/// Parameters for [`Warmth`].
#[derive(Debug)]
pub struct WarmthSettings {
    /// Warmth amount in percent - more warmth pulls the cutoff lower.
    pub amount: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for WarmthSettings {
    fn default() -> Self {
        Self {
            amount: FloatParam::new("Amount", 50.0, 0.0, 100.0, ParamUnit::Percent),
            wet: FloatParam::new("Wet", 100.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for WarmthSettings {
    fn effect_name(&self) -> &'static str {
        "Warmth"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.amount, &self.wet]
    }
}

/// Per-channel filter cascade state.
#[derive(Debug, Default, Clone)]
struct WarmthChannel {
    poles: [OnePoleLp; 4],
}

/// Analog-style high-frequency rolloff.
///
/// Four identical one-pole lowpass stages in series give -24 dB/octave.
/// The amount knob maps to cutoff: 0% leaves the signal nearly open at
/// 12 kHz, 100% darkens it down to 800 Hz.
#[derive(Debug)]
pub struct Warmth {
    settings: Arc<WarmthSettings>,
    enabled: bool,
    sample_rate: f32,
    channels: Vec<WarmthChannel>,
    last_amount: f32,
}

impl Warmth {
    /// Create a warmth stage.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(WarmthSettings::default()),
            enabled: true,
            sample_rate,
            channels: Vec::new(),
            last_amount: f32::NAN,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &WarmthSettings {
        &self.settings
    }

    fn cutoff_hz(amount: f32) -> f32 {
        lerp(12000.0, 800.0, amount / 100.0)
    }
}

impl Effect for Warmth {
    fn kind(&self) -> EffectKind {
        EffectKind::Warmth
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
        let amount = self.settings.amount.get();

        let had_channels = self.channels.len();
        grow_channels(&mut self.channels, channels);
        if self.channels.len() != had_channels {
            // Freshly grown poles carry inert coefficients
            self.last_amount = f32::NAN;
        }
        if amount != self.last_amount {
            let cutoff = Self::cutoff_hz(amount);
            for state in &mut self.channels {
                for pole in &mut state.poles {
                    pole.set_cutoff(self.sample_rate, cutoff);
                }
            }
            self.last_amount = amount;
        }

        for frame in buffer.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let mut filtered = dry;
                for pole in &mut self.channels[ch].poles {
                    filtered = pole.process(filtered);
                }
                *sample = wet_dry_mix(dry, filtered, wet);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.last_amount = f32::NAN;
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            for pole in &mut state.poles {
                pole.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_zero_is_identity() {
        let mut warmth = Warmth::new(48000.0);
        warmth.settings().wet.set(0.0);
        let mut buffer = [0.5f32, -0.25, 0.75, -0.5];
        let original = buffer;
        warmth.process(&mut buffer, 2);
        assert_eq!(buffer, original);
    }

    #[test]
    fn darkens_high_frequencies() {
        let mut warmth = Warmth::new(48000.0);
        warmth.settings().amount.set(100.0);

        // 8 kHz sine, mono
        let mut buffer: Vec<f32> = (0..4800)
            .map(|i| libm::sinf(core::f32::consts::TAU * 8000.0 * i as f32 / 48000.0))
            .collect();
        warmth.process(&mut buffer, 1);
        let peak = buffer[2400..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak < 0.05, "8 kHz should be heavily attenuated, got {peak}");
    }

    #[test]
    fn passes_low_frequencies() {
        let mut warmth = Warmth::new(48000.0);
        warmth.settings().amount.set(50.0);

        // 100 Hz sine is far below even the darkest cutoff
        let mut buffer: Vec<f32> = (0..9600)
            .map(|i| libm::sinf(core::f32::consts::TAU * 100.0 * i as f32 / 48000.0))
            .collect();
        warmth.process(&mut buffer, 1);
        let peak = buffer[4800..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.9, "100 Hz should pass, got {peak}");
    }
}
