//! Feedback echo delay.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    DelayLine, Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank, Smoother,
    flush_denormal, wet_dry_mix,
};
use libm::logf;

/// Maximum delay time (and buffer capacity) in milliseconds.
const MAX_DELAY_MS: f32 = 2000.0;

/// -60 dB: the point where a decaying echo counts as silent.
const TAIL_THRESHOLD: f32 = 0.001;

/// Per-sample coefficient for the delay-time glide. This exact constant is
/// what keeps time-knob changes click-free without smearing the echo.
const TIME_SMOOTH_COEFF: f32 = 0.001;

/// Parameters for [`Delay`].
#[derive(Debug)]
pub struct DelaySettings {
    /// Delay time in milliseconds.
    pub time_ms: FloatParam,
    /// Feedback in percent (capped at 95).
    pub feedback: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self {
            time_ms: FloatParam::new("Time", 400.0, 1.0, MAX_DELAY_MS, ParamUnit::Milliseconds),
            feedback: FloatParam::new("Feedback", 40.0, 0.0, 95.0, ParamUnit::Percent),
            wet: FloatParam::new("Wet", 50.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for DelaySettings {
    fn effect_name(&self) -> &'static str {
        "Delay"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.time_ms, &self.feedback, &self.wet]
    }

    fn presets(&self) -> Vec<cadena_core::FactoryPreset> {
        use cadena_core::{FactoryPreset, ParamValue};
        vec![
            FactoryPreset::new(
                "Slapback",
                vec![
                    ParamValue::Float(110.0),
                    ParamValue::Float(10.0),
                    ParamValue::Float(35.0),
                ],
            ),
            FactoryPreset::new(
                "Dub",
                vec![
                    ParamValue::Float(500.0),
                    ParamValue::Float(70.0),
                    ParamValue::Float(50.0),
                ],
            ),
        ]
    }
}

/// Classic feedback delay over a fractional circular buffer per channel.
///
/// The audible delay time glides toward the knob value through a slow
/// one-pole ([`TIME_SMOOTH_COEFF`]); the glide is shared by all channels
/// so the stereo image stays put while the time changes.
#[derive(Debug)]
pub struct Delay {
    settings: Arc<DelaySettings>,
    enabled: bool,
    sample_rate: f32,
    lines: Vec<DelayLine>,
    time_smooth: Smoother,
}

impl Delay {
    /// Create a delay.
    pub fn new(sample_rate: f32) -> Self {
        let default_samples = 400.0 / 1000.0 * sample_rate;
        Self {
            settings: Arc::new(DelaySettings::default()),
            enabled: true,
            sample_rate,
            lines: Vec::new(),
            time_smooth: Smoother::new(TIME_SMOOTH_COEFF, default_samples),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &DelaySettings {
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

impl Effect for Delay {
    fn kind(&self) -> EffectKind {
        EffectKind::Delay
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
        let feedback = self.settings.feedback.get() / 100.0;
        let target_samples = self.settings.time_ms.get() / 1000.0 * self.sample_rate;
        self.ensure_channels(channels);

        for frame in buffer.chunks_exact_mut(channels) {
            let delay_samples = self.time_smooth.next(target_samples);
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
        let channels = self.lines.len();
        self.lines.clear();
        self.ensure_channels(channels);
        self.time_smooth
            .snap(self.settings.time_ms.get() / 1000.0 * sample_rate);
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.time_smooth
            .snap(self.settings.time_ms.get() / 1000.0 * self.sample_rate);
    }

    /// Analytic tail: echoes decay by the feedback factor each repeat, so
    /// the count of repeats to reach -60 dB is `ln(0.001) / ln(feedback)`
    /// and the tail is that many delay periods.
    fn tail_seconds(&self) -> f32 {
        let time_s = self.settings.time_ms.get() / 1000.0;
        let feedback = self.settings.feedback.get() / 100.0;
        if feedback <= 0.0 {
            return time_s;
        }
        let iterations = logf(TAIL_THRESHOLD) / logf(feedback);
        iterations * time_s
    }
}
