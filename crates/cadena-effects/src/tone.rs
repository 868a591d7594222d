//! Bass/mid/treble tone stage.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Biquad, BiquadCoeffs, Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank,
    grow_channels, high_shelf_coeffs, low_shelf_coeffs, peaking_coeffs,
};

const BASS_HZ: f32 = 250.0;
const MID_HZ: f32 = 1000.0;
const TREBLE_HZ: f32 = 4000.0;
const MID_Q: f32 = 0.7;

/// Parameters for [`Tone`].
#[derive(Debug)]
pub struct ToneSettings {
    /// Low-shelf gain in dB.
    pub bass_db: FloatParam,
    /// Mid-peak gain in dB.
    pub mid_db: FloatParam,
    /// High-shelf gain in dB.
    pub treble_db: FloatParam,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            bass_db: FloatParam::new("Bass", 0.0, -12.0, 12.0, ParamUnit::Decibels),
            mid_db: FloatParam::new("Mid", 0.0, -12.0, 12.0, ParamUnit::Decibels),
            treble_db: FloatParam::new("Treble", 0.0, -12.0, 12.0, ParamUnit::Decibels),
        }
    }
}

impl SettingsBank for ToneSettings {
    fn effect_name(&self) -> &'static str {
        "Tone"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.bass_db, &self.mid_db, &self.treble_db]
    }
}

/// Per-channel three-filter stack.
#[derive(Debug, Default, Clone)]
struct ToneChannel {
    bass: Biquad,
    mid: Biquad,
    treble: Biquad,
}

/// Classic amp-style tone stack: low shelf at 250 Hz, peaking mid at
/// 1 kHz, high shelf at 4 kHz, all per channel.
#[derive(Debug)]
pub struct Tone {
    settings: Arc<ToneSettings>,
    enabled: bool,
    sample_rate: f32,
    channels: Vec<ToneChannel>,
    last_gains: [f32; 3],
    coeff_cache: [BiquadCoeffs; 3],
}

impl Tone {
    /// Create a flat tone stage.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(ToneSettings::default()),
            enabled: true,
            sample_rate,
            channels: Vec::new(),
            last_gains: [f32::NAN; 3],
            coeff_cache: [BiquadCoeffs::IDENTITY; 3],
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &ToneSettings {
        &self.settings
    }

    fn refresh_coeffs(&mut self) {
        let gains = [
            self.settings.bass_db.get(),
            self.settings.mid_db.get(),
            self.settings.treble_db.get(),
        ];
        if gains == self.last_gains {
            return;
        }
        self.coeff_cache = [
            low_shelf_coeffs(BASS_HZ, gains[0], self.sample_rate),
            peaking_coeffs(MID_HZ, MID_Q, gains[1], self.sample_rate),
            high_shelf_coeffs(TREBLE_HZ, gains[2], self.sample_rate),
        ];
        for state in &mut self.channels {
            state.bass.set_coeffs(self.coeff_cache[0]);
            state.mid.set_coeffs(self.coeff_cache[1]);
            state.treble.set_coeffs(self.coeff_cache[2]);
        }
        self.last_gains = gains;
    }
}

impl Effect for Tone {
    fn kind(&self) -> EffectKind {
        EffectKind::Tone
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
        let flat = self.settings.bass_db.get().abs() < 0.01
            && self.settings.mid_db.get().abs() < 0.01
            && self.settings.treble_db.get().abs() < 0.01;
        if flat {
            return;
        }

        let had_channels = self.channels.len();
        grow_channels(&mut self.channels, channels);
        if self.channels.len() != had_channels {
            for state in &mut self.channels[had_channels..] {
                state.bass.set_coeffs(self.coeff_cache[0]);
                state.mid.set_coeffs(self.coeff_cache[1]);
                state.treble.set_coeffs(self.coeff_cache[2]);
            }
        }
        self.refresh_coeffs();

        for frame in buffer.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let state = &mut self.channels[ch];
                let mut signal = state.bass.process(*sample);
                signal = state.mid.process(signal);
                *sample = state.treble.process(signal);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.last_gains = [f32::NAN; 3];
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            state.bass.reset();
            state.mid.reset();
            state.treble.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_is_identity() {
        let mut tone = Tone::new(48000.0);
        let mut buffer = [0.5f32, -0.3, 0.1, 0.9];
        let original = buffer;
        tone.process(&mut buffer, 2);
        assert_eq!(buffer, original);
    }

    #[test]
    fn bass_boost_raises_lows() {
        let mut tone = Tone::new(48000.0);
        tone.settings().bass_db.set(12.0);

        let mut buffer: Vec<f32> = (0..24000)
            .map(|i| libm::sinf(core::f32::consts::TAU * 60.0 * i as f32 / 48000.0))
            .collect();
        tone.process(&mut buffer, 1);
        let peak = buffer[12000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 2.0, "60 Hz should be boosted, got {peak}");
    }

    #[test]
    fn treble_cut_lowers_highs() {
        let mut tone = Tone::new(48000.0);
        tone.settings().treble_db.set(-12.0);

        let mut buffer: Vec<f32> = (0..24000)
            .map(|i| libm::sinf(core::f32::consts::TAU * 10000.0 * i as f32 / 48000.0))
            .collect();
        tone.process(&mut buffer, 1);
        let peak = buffer[12000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak < 0.4, "10 kHz should be cut, got {peak}");
    }
}
