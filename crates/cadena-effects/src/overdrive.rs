//! Tanh overdrive with a tone control.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, OnePoleLp, Param, ParamUnit, SettingsBank, db_to_linear,
    grow_channels, hard_clip, soft_clip, wet_dry_mix,
};

/// Parameters for [`Overdrive`].
#[derive(Debug)]
pub struct OverdriveSettings {
    /// Input drive in dB.
    pub drive_db: FloatParam,
    /// Tone lowpass cutoff in Hz.
    pub tone_hz: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for OverdriveSettings {
    fn default() -> Self {
        Self {
            drive_db: FloatParam::new("Drive", 10.0, 0.0, 30.0, ParamUnit::Decibels),
            tone_hz: FloatParam::new("Tone", 3000.0, 500.0, 8000.0, ParamUnit::Hertz),
            wet: FloatParam::new("Wet", 100.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for OverdriveSettings {
    fn effect_name(&self) -> &'static str {
        "Overdrive"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.drive_db, &self.tone_hz, &self.wet]
    }
}

/// Smooth tanh saturation followed by a one-pole tone lowpass.
///
/// The tone filter runs per channel, so the interleaved walk steps frame
/// by frame and routes each float to its channel's filter.
#[derive(Debug)]
pub struct Overdrive {
    settings: Arc<OverdriveSettings>,
    enabled: bool,
    sample_rate: f32,
    tone: Vec<OnePoleLp>,
    last_tone_hz: f32,
}

impl Overdrive {
    /// Create an overdrive stage.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(OverdriveSettings::default()),
            enabled: true,
            sample_rate,
            tone: Vec::new(),
            last_tone_hz: 0.0,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &OverdriveSettings {
        &self.settings
    }
}

impl Effect for Overdrive {
    fn kind(&self) -> EffectKind {
        EffectKind::Overdrive
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
        let drive = db_to_linear(self.settings.drive_db.get());
        let tone_hz = self.settings.tone_hz.get();

        let had_channels = self.tone.len();
        grow_channels(&mut self.tone, channels);
        if self.tone.len() != had_channels {
            // Freshly grown filters carry inert coefficients
            self.last_tone_hz = 0.0;
        }
        if tone_hz != self.last_tone_hz {
            for lp in &mut self.tone {
                lp.set_cutoff(self.sample_rate, tone_hz);
            }
            self.last_tone_hz = tone_hz;
        }

        for frame in buffer.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let shaped = self.tone[ch].process(soft_clip(dry * drive));
                *sample = hard_clip(wet_dry_mix(dry, shaped, wet), 1.0);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        // Force coefficient recompute on the next block
        self.last_tone_hz = 0.0;
    }

    fn reset(&mut self) {
        for lp in &mut self.tone {
            lp.reset();
        }
    }
}
