//! Bit-depth and sample-rate crusher.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, IntParam, Param, ParamUnit, SettingsBank, grow_channels,
    hard_clip, wet_dry_mix,
};
use libm::floorf;

/// Parameters for [`Bitcrusher`].
#[derive(Debug)]
pub struct BitcrusherSettings {
    /// Output bit depth (1-16 bits).
    pub bits: IntParam,
    /// Emulated sample rate in Hz.
    pub rate_hz: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for BitcrusherSettings {
    fn default() -> Self {
        Self {
            bits: IntParam::new("Bits", 8, 1, 16, ParamUnit::None),
            rate_hz: FloatParam::new("Rate", 44100.0, 1000.0, 44100.0, ParamUnit::Hertz),
            wet: FloatParam::new("Wet", 100.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for BitcrusherSettings {
    fn effect_name(&self) -> &'static str {
        "Bitcrusher"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.bits, &self.rate_hz, &self.wet]
    }
}

/// Per-channel zero-order-hold state.
#[derive(Debug, Default, Clone)]
struct CrushChannel {
    held: f32,
    accum: f32,
}

/// Digital degradation: mid-rise quantization to `2^bits` levels plus
/// zero-order-hold rate reduction.
///
/// At `bits = 4` the output takes at most 16 distinct values; the hard
/// clamp keeps the top quantization step from poking above full scale.
#[derive(Debug)]
pub struct Bitcrusher {
    settings: Arc<BitcrusherSettings>,
    enabled: bool,
    sample_rate: f32,
    channels: Vec<CrushChannel>,
}

impl Bitcrusher {
    /// Create a bitcrusher.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(BitcrusherSettings::default()),
            enabled: true,
            sample_rate,
            channels: Vec::new(),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &BitcrusherSettings {
        &self.settings
    }

    /// Mid-rise quantizer to `2^bits` levels over [-1, 1].
    ///
    /// The step index is clamped so +1.0 full scale lands on the top level
    /// instead of creating a 2^bits + 1st value above it.
    #[inline]
    fn quantize(x: f32, bits: i32) -> f32 {
        let half_levels = (1u32 << (bits - 1)) as f32; // levels / 2
        let idx = floorf(x * half_levels).clamp(-half_levels, half_levels - 1.0);
        (idx + 0.5) / half_levels
    }
}

impl Effect for Bitcrusher {
    fn kind(&self) -> EffectKind {
        EffectKind::Bitcrusher
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
        let bits = self.settings.bits.get();
        let step = (self.settings.rate_hz.get() / self.sample_rate).min(1.0);

        grow_channels(&mut self.channels, channels);

        for frame in buffer.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let state = &mut self.channels[ch];
                state.accum += step;
                if state.accum >= 1.0 {
                    state.accum -= 1.0;
                    state.held = Self::quantize(dry, bits);
                }
                *sample = hard_clip(wet_dry_mix(dry, state.held, wet), 1.0);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            state.held = 0.0;
            state.accum = 0.0;
        }
    }
}
