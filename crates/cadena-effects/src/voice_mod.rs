//! Delay-line pitch shifter ("voice modulator").

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    DelayLine, Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank, wet_dry_mix,
};
use libm::powf;

/// Grain window length in milliseconds.
const WINDOW_MS: f32 = 50.0;

/// Parameters for [`VoiceModulator`].
#[derive(Debug)]
pub struct VoiceModulatorSettings {
    /// Pitch shift in semitones.
    pub semitones: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for VoiceModulatorSettings {
    fn default() -> Self {
        Self {
            semitones: FloatParam::new("Pitch", 0.0, -12.0, 12.0, ParamUnit::None),
            wet: FloatParam::new("Wet", 100.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for VoiceModulatorSettings {
    fn effect_name(&self) -> &'static str {
        "Voice Modulator"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.semitones, &self.wet]
    }
}

/// Dual-tap pitch shifter.
///
/// Two read taps slide through a 50 ms window at rate `1 - 2^(st/12)`
/// relative to the write head; sliding toward the write head raises pitch,
/// away lowers it. The taps sit half a window apart and are crossfaded
/// with complementary triangle gains, so each tap is silent at the moment
/// it wraps.
#[derive(Debug)]
pub struct VoiceModulator {
    settings: Arc<VoiceModulatorSettings>,
    enabled: bool,
    sample_rate: f32,
    lines: Vec<DelayLine>,
    /// Tap position inside the window, in samples (fractional).
    tap_pos: f32,
}

impl VoiceModulator {
    /// Create a pitch shifter.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(VoiceModulatorSettings::default()),
            enabled: true,
            sample_rate,
            lines: Vec::new(),
            tap_pos: 0.0,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &VoiceModulatorSettings {
        &self.settings
    }

    fn window_samples(&self) -> f32 {
        WINDOW_MS / 1000.0 * self.sample_rate
    }

    fn ensure_channels(&mut self, channels: usize) {
        while self.lines.len() < channels {
            self.lines
                .push(DelayLine::from_seconds(self.sample_rate, WINDOW_MS / 1000.0));
        }
    }
}

impl Effect for VoiceModulator {
    fn kind(&self) -> EffectKind {
        EffectKind::VoiceModulator
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
        let semitones = self.settings.semitones.get();
        if wet <= 0.001 || semitones.abs() < 0.01 {
            return;
        }
        let ratio = powf(2.0, semitones / 12.0);
        self.ensure_channels(channels);

        let window = self.window_samples();
        let half = window * 0.5;

        for frame in buffer.chunks_exact_mut(channels) {
            // Tap drifts relative to the write head at 1 - ratio per frame.
            self.tap_pos += 1.0 - ratio;
            if self.tap_pos >= window {
                self.tap_pos -= window;
            } else if self.tap_pos < 0.0 {
                self.tap_pos += window;
            }

            let tap_a = self.tap_pos;
            let mut tap_b = tap_a + half;
            if tap_b >= window {
                tap_b -= window;
            }
            // Complementary triangle gains - each tap fades to zero before
            // it wraps across the window edge.
            let fade = tap_a / window;
            let gain_a = 1.0 - (2.0 * fade - 1.0).abs();
            let gain_b = 1.0 - gain_a;

            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let line = &mut self.lines[ch];
                line.write(dry);
                let shifted = line.read(tap_a) * gain_a + line.read(tap_b) * gain_b;
                *sample = wet_dry_mix(dry, shifted, wet);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let channels = self.lines.len();
        self.lines.clear();
        self.ensure_channels(channels);
    }

    fn reset(&mut self) {
        self.tap_pos = 0.0;
        for line in &mut self.lines {
            line.clear();
        }
    }
}
