//! Short modulated delay with feedback.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    DelayLine, Effect, EffectKind, FloatParam, Lfo, Param, ParamUnit, SettingsBank,
    flush_denormal, wet_dry_mix,
};

/// Sweep floor in milliseconds.
const MIN_DELAY_MS: f32 = 1.0;
/// Sweep ceiling in milliseconds at full depth.
const MAX_SWEEP_MS: f32 = 7.0;
/// Buffer capacity in milliseconds.
const MAX_DELAY_MS: f32 = 12.0;

/// Parameters for [`Flanger`].
#[derive(Debug)]
pub struct FlangerSettings {
    /// LFO rate in Hz.
    pub rate_hz: FloatParam,
    /// Sweep depth in percent.
    pub depth: FloatParam,
    /// Feedback in percent (capped at 95 to stay stable).
    pub feedback: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for FlangerSettings {
    fn default() -> Self {
        Self {
            rate_hz: FloatParam::new("Rate", 0.25, 0.05, 2.0, ParamUnit::Hertz),
            depth: FloatParam::new("Depth", 70.0, 0.0, 100.0, ParamUnit::Percent),
            feedback: FloatParam::new("Feedback", 50.0, 0.0, 95.0, ParamUnit::Percent),
            wet: FloatParam::new("Wet", 50.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for FlangerSettings {
    fn effect_name(&self) -> &'static str {
        "Flanger"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.rate_hz, &self.depth, &self.feedback, &self.wet]
    }
}

/// Jet-plane comb sweep: a 1-8 ms delay tap modulated by the LFO, with the
/// delayed signal fed back into the line.
#[derive(Debug)]
pub struct Flanger {
    settings: Arc<FlangerSettings>,
    enabled: bool,
    sample_rate: f32,
    lfo: Lfo,
    lines: Vec<DelayLine>,
}

impl Flanger {
    /// Create a flanger.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(FlangerSettings::default()),
            enabled: true,
            sample_rate,
            lfo: Lfo::new(sample_rate, 0.25),
            lines: Vec::new(),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &FlangerSettings {
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

impl Effect for Flanger {
    fn kind(&self) -> EffectKind {
        EffectKind::Flanger
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
        let feedback = self.settings.feedback.get() / 100.0;
        self.lfo.set_frequency(self.settings.rate_hz.get());
        self.ensure_channels(channels);

        let ms_to_samples = self.sample_rate / 1000.0;
        let min = MIN_DELAY_MS * ms_to_samples;
        let sweep = MAX_SWEEP_MS * depth * ms_to_samples;

        for frame in buffer.chunks_exact_mut(channels) {
            let delay_samples = min + self.lfo.next_unipolar() * sweep;
            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let line = &mut self.lines[ch];
                let delayed = line.read(delay_samples);
                line.write(flush_denormal(dry + delayed * feedback));
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
