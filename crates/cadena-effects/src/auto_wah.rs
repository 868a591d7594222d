//! Envelope-following wah filter.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, EnvelopeFollower, FloatParam, Param, ParamUnit, SettingsBank,
    flush_denormal, grow_channels, wet_dry_mix,
};
use libm::sinf;

/// Filter sweep floor in Hz.
const SWEEP_MIN_HZ: f32 = 250.0;
/// Filter sweep ceiling in Hz at full sensitivity.
const SWEEP_MAX_HZ: f32 = 2500.0;

/// Parameters for [`AutoWah`].
#[derive(Debug)]
pub struct AutoWahSettings {
    /// How far the envelope pushes the sweep, in percent.
    pub sensitivity: FloatParam,
    /// Filter resonance.
    pub resonance: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for AutoWahSettings {
    fn default() -> Self {
        Self {
            sensitivity: FloatParam::new("Sensitivity", 70.0, 0.0, 100.0, ParamUnit::Percent),
            resonance: FloatParam::new("Resonance", 3.0, 1.0, 10.0, ParamUnit::None),
            wet: FloatParam::new("Wet", 100.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for AutoWahSettings {
    fn effect_name(&self) -> &'static str {
        "Auto Wah"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.sensitivity, &self.resonance, &self.wet]
    }
}

/// Per-channel state-variable filter core.
#[derive(Debug, Default, Clone)]
struct WahChannel {
    low: f32,
    band: f32,
}

/// Touch-controlled wah.
///
/// A mono envelope follower tracks playing intensity and sweeps the center
/// of a Chamberlin state-variable bandpass between 250 Hz and 2.5 kHz -
/// dig in and the filter opens up. The SVF form takes a per-frame cutoff
/// without any coefficient table recompute.
#[derive(Debug)]
pub struct AutoWah {
    settings: Arc<AutoWahSettings>,
    enabled: bool,
    sample_rate: f32,
    env: EnvelopeFollower,
    channels: Vec<WahChannel>,
}

impl AutoWah {
    /// Create an auto-wah.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(AutoWahSettings::default()),
            enabled: true,
            sample_rate,
            env: EnvelopeFollower::new(sample_rate, 5.0, 120.0),
            channels: Vec::new(),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &AutoWahSettings {
        &self.settings
    }
}

impl Effect for AutoWah {
    fn kind(&self) -> EffectKind {
        EffectKind::AutoWah
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
        let sensitivity = self.settings.sensitivity.get() / 100.0;
        let q_inv = 1.0 / self.settings.resonance.get();
        grow_channels(&mut self.channels, channels);

        let inv_channels = 1.0 / channels as f32;
        for frame in buffer.chunks_exact_mut(channels) {
            let mono = frame.iter().map(|s| s.abs()).sum::<f32>() * inv_channels;
            let drive = (self.env.process(mono) * sensitivity * 4.0).min(1.0);
            let cutoff = SWEEP_MIN_HZ + (SWEEP_MAX_HZ - SWEEP_MIN_HZ) * drive;

            // Chamberlin SVF frequency coefficient
            let f = 2.0 * sinf(core::f32::consts::PI * cutoff / self.sample_rate);

            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let state = &mut self.channels[ch];
                state.low = flush_denormal(state.low + f * state.band);
                let high = dry - state.low - q_inv * state.band;
                state.band = flush_denormal(state.band + f * high);
                *sample = wet_dry_mix(dry, state.band, wet);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.env.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.env.reset();
        for state in &mut self.channels {
            state.low = 0.0;
            state.band = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_zero_is_identity() {
        let mut wah = AutoWah::new(48000.0);
        wah.settings().wet.set(0.0);
        let mut buffer = [0.5f32; 128];
        let original = buffer;
        wah.process(&mut buffer, 2);
        assert_eq!(&buffer[..], &original[..]);
    }

    #[test]
    fn output_stays_finite() {
        let mut wah = AutoWah::new(48000.0);
        wah.settings().resonance.set(10.0);
        let mut buffer: Vec<f32> = (0..48000)
            .map(|i| libm::sinf(core::f32::consts::TAU * 440.0 * i as f32 / 48000.0) * 0.8)
            .collect();
        wah.process(&mut buffer, 1);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn bandpass_rejects_extremes() {
        // A wah is a bandpass: DC input should produce near-zero output
        // once the filter settles.
        let mut wah = AutoWah::new(48000.0);
        wah.settings().wet.set(100.0);
        let mut buffer = [0.3f32; 24000];
        wah.process(&mut buffer, 1);
        assert!(
            buffer[23999].abs() < 0.05,
            "DC should be rejected, got {}",
            buffer[23999]
        );
    }

    #[test]
    fn envelope_moves_the_filter() {
        // Same tone at two very different levels must filter differently
        // (beyond pure level scaling) because the sweep follows level.
        let tone =
            |amp: f32| -> Vec<f32> {
                (0..24000)
                    .map(|i| {
                        libm::sinf(core::f32::consts::TAU * 600.0 * i as f32 / 48000.0) * amp
                    })
                    .collect()
            };

        let mut wah_soft = AutoWah::new(48000.0);
        let mut soft = tone(0.05);
        wah_soft.process(&mut soft, 1);

        let mut wah_hard = AutoWah::new(48000.0);
        let mut hard = tone(1.0);
        wah_hard.process(&mut hard, 1);

        let peak = |b: &[f32]| b[12000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let soft_norm = peak(&soft) / 0.05;
        let hard_norm = peak(&hard) / 1.0;
        let ratio = soft_norm / hard_norm;
        assert!(
            (ratio - 1.0).abs() > 0.1,
            "sweep should change the response, ratio {ratio}"
        );
    }
}
