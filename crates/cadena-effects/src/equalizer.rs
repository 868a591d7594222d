//! Nine-band graphic equalizer.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Biquad, Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank, grow_channels,
    peaking_coeffs,
};

/// Band center frequencies in Hz, one octave apart.
pub const BAND_FREQUENCIES: [f32; 9] = [
    63.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

const BAND_Q: f32 = 1.2;

/// Parameters for [`Equalizer`]: one gain per octave band.
#[derive(Debug)]
pub struct EqualizerSettings {
    /// Per-band gain in dB, low to high.
    pub bands: [FloatParam; 9],
}

impl Default for EqualizerSettings {
    fn default() -> Self {
        const NAMES: [&str; 9] = [
            "63 Hz", "125 Hz", "250 Hz", "500 Hz", "1 kHz", "2 kHz", "4 kHz", "8 kHz", "16 kHz",
        ];
        Self {
            bands: core::array::from_fn(|i| {
                FloatParam::new(NAMES[i], 0.0, -12.0, 12.0, ParamUnit::Decibels)
            }),
        }
    }
}

impl SettingsBank for EqualizerSettings {
    fn effect_name(&self) -> &'static str {
        "Equalizer"
    }

    fn params(&self) -> Vec<&dyn Param> {
        self.bands.iter().map(|band| band as &dyn Param).collect()
    }
}

/// Per-channel filter bank.
#[derive(Debug, Default, Clone)]
struct EqChannel {
    filters: [Biquad; 9],
}

/// Nine cascaded RBJ peaking filters, 63 Hz to 16 kHz.
///
/// Each band carries its own history per channel. Coefficients recompute
/// only when a band gain changes, and bands sitting at 0 dB are skipped
/// entirely; with every slider centered the effect is a true no-op.
#[derive(Debug)]
pub struct Equalizer {
    settings: Arc<EqualizerSettings>,
    enabled: bool,
    sample_rate: f32,
    channels: Vec<EqChannel>,
    last_gains: [f32; 9],
    coeff_cache: [cadena_core::BiquadCoeffs; 9],
}

impl Equalizer {
    /// Create an equalizer with all bands flat.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(EqualizerSettings::default()),
            enabled: true,
            sample_rate,
            channels: Vec::new(),
            last_gains: [f32::NAN; 9],
            coeff_cache: [cadena_core::BiquadCoeffs::IDENTITY; 9],
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &EqualizerSettings {
        &self.settings
    }

    fn refresh_coeffs(&mut self) {
        let nyquist_guard = self.sample_rate * 0.45;
        for (band, &freq) in BAND_FREQUENCIES.iter().enumerate() {
            let gain = self.settings.bands[band].get();
            if gain != self.last_gains[band] {
                self.coeff_cache[band] =
                    peaking_coeffs(freq.min(nyquist_guard), BAND_Q, gain, self.sample_rate);
                for state in &mut self.channels {
                    state.filters[band].set_coeffs(self.coeff_cache[band]);
                }
                self.last_gains[band] = gain;
            }
        }
    }
}

impl Effect for Equalizer {
    fn kind(&self) -> EffectKind {
        EffectKind::Equalizer
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
        // All-flat is the wet==0 analog for an EQ
        let active: [bool; 9] =
            core::array::from_fn(|i| self.settings.bands[i].get().abs() > 0.01);
        if active.iter().all(|&on| !on) {
            return;
        }

        let had_channels = self.channels.len();
        grow_channels(&mut self.channels, channels);
        if self.channels.len() != had_channels {
            // Newly grown channels must pick up the cached coefficients
            for state in &mut self.channels[had_channels..] {
                for (band, filter) in state.filters.iter_mut().enumerate() {
                    filter.set_coeffs(self.coeff_cache[band]);
                }
            }
        }
        self.refresh_coeffs();

        for frame in buffer.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let mut signal = *sample;
                let state = &mut self.channels[ch];
                for (band, filter) in state.filters.iter_mut().enumerate() {
                    if active[band] {
                        signal = filter.process(signal);
                    }
                }
                *sample = signal;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.last_gains = [f32::NAN; 9];
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            for filter in &mut state.filters {
                filter.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, len: usize, sample_rate: f32) -> Vec<f32> {
        (0..len)
            .map(|i| libm::sinf(core::f32::consts::TAU * freq * i as f32 / sample_rate))
            .collect()
    }

    fn peak(buffer: &[f32]) -> f32 {
        buffer[buffer.len() / 2..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn flat_bands_are_identity() {
        let mut eq = Equalizer::new(48000.0);
        let mut buffer = [0.5f32, -0.3, 0.2, -0.1];
        let original = buffer;
        eq.process(&mut buffer, 2);
        assert_eq!(buffer, original);
    }

    #[test]
    fn boost_raises_band() {
        let mut eq = Equalizer::new(48000.0);
        eq.settings().bands[4].set(12.0); // 1 kHz
        let mut buffer = sine(1000.0, 24000, 48000.0);
        eq.process(&mut buffer, 1);
        let p = peak(&buffer);
        assert!(p > 2.5, "1 kHz should be boosted ~4x, got {p}");
    }

    #[test]
    fn cut_lowers_band_and_leaves_others() {
        let mut eq = Equalizer::new(48000.0);
        eq.settings().bands[4].set(-12.0); // 1 kHz

        let mut at_band = sine(1000.0, 24000, 48000.0);
        eq.process(&mut at_band, 1);
        assert!(peak(&at_band) < 0.4, "1 kHz should be cut, got {}", peak(&at_band));

        let mut eq2 = Equalizer::new(48000.0);
        eq2.settings().bands[4].set(-12.0);
        let mut far_away = sine(8000.0, 24000, 48000.0);
        eq2.process(&mut far_away, 1);
        assert!(
            peak(&far_away) > 0.8,
            "8 kHz should be mostly untouched, got {}",
            peak(&far_away)
        );
    }

    #[test]
    fn band_count_matches_params() {
        let eq = Equalizer::new(48000.0);
        assert_eq!(eq.settings().param_count(), BAND_FREQUENCIES.len());
    }
}
