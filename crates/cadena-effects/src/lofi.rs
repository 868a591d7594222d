//! Consumer sound-card emulation: dull lowpass plus sample-rate reduction.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, OnePoleLp, Param, ParamUnit, SettingsBank, grow_channels,
    wet_dry_mix,
};

/// Parameters for [`LoFi`].
#[derive(Debug)]
pub struct LoFiSettings {
    /// Lowpass cutoff in Hz.
    pub cutoff_hz: FloatParam,
    /// Emulated converter rate in Hz.
    pub rate_hz: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for LoFiSettings {
    fn default() -> Self {
        Self {
            cutoff_hz: FloatParam::new("Cutoff", 6000.0, 1000.0, 12000.0, ParamUnit::Hertz),
            rate_hz: FloatParam::new("Rate", 11025.0, 2000.0, 44100.0, ParamUnit::Hertz),
            wet: FloatParam::new("Wet", 100.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for LoFiSettings {
    fn effect_name(&self) -> &'static str {
        "Lo-Fi"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.cutoff_hz, &self.rate_hz, &self.wet]
    }
}

/// Per-channel lowpass and sample-hold state.
#[derive(Debug, Default, Clone)]
struct LoFiChannel {
    lp: OnePoleLp,
    held: f32,
    accum: f32,
}

/// Cheap-converter emulation.
///
/// A one-pole lowpass tames the top end, then a zero-order hold resamples
/// at the emulated rate: the hold accumulator gains `rate/sample_rate` per
/// frame and latches a new output sample each time it crosses 1.
#[derive(Debug)]
pub struct LoFi {
    settings: Arc<LoFiSettings>,
    enabled: bool,
    sample_rate: f32,
    channels: Vec<LoFiChannel>,
    last_cutoff: f32,
}

impl LoFi {
    /// Create a lo-fi stage.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(LoFiSettings::default()),
            enabled: true,
            sample_rate,
            channels: Vec::new(),
            last_cutoff: f32::NAN,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &LoFiSettings {
        &self.settings
    }
}

impl Effect for LoFi {
    fn kind(&self) -> EffectKind {
        EffectKind::LoFi
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
        let cutoff = self.settings.cutoff_hz.get();
        let step = (self.settings.rate_hz.get() / self.sample_rate).min(1.0);

        let had_channels = self.channels.len();
        grow_channels(&mut self.channels, channels);
        if self.channels.len() != had_channels {
            // Freshly grown filters carry inert coefficients
            self.last_cutoff = f32::NAN;
        }
        if cutoff != self.last_cutoff {
            for state in &mut self.channels {
                state.lp.set_cutoff(self.sample_rate, cutoff);
            }
            self.last_cutoff = cutoff;
        }

        for frame in buffer.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let state = &mut self.channels[ch];
                let filtered = state.lp.process(dry);
                state.accum += step;
                if state.accum >= 1.0 {
                    state.accum -= 1.0;
                    state.held = filtered;
                }
                *sample = wet_dry_mix(dry, state.held, wet);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.last_cutoff = f32::NAN;
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            state.lp.reset();
            state.held = 0.0;
            state.accum = 0.0;
        }
    }
}
