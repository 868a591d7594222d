//! Clean gain stage.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank, db_to_linear, hard_clip,
};

/// Parameters for [`Preamp`].
#[derive(Debug)]
pub struct PreampSettings {
    /// Gain in dB.
    pub gain_db: FloatParam,
}

impl Default for PreampSettings {
    fn default() -> Self {
        Self {
            gain_db: FloatParam::new("Gain", 0.0, -20.0, 20.0, ParamUnit::Decibels),
        }
    }
}

impl SettingsBank for PreampSettings {
    fn effect_name(&self) -> &'static str {
        "Preamp"
    }

    fn params(&self) -> Vec<&dyn Param> {
        [&self.gain_db as &dyn Param].into()
    }
}

/// High-headroom clean gain stage.
///
/// Multiplies by the linear gain and clamps at +/-2.0 - enough headroom to
/// drive a following distortion stage without wrapping to garbage on hot
/// signals.
#[derive(Debug)]
pub struct Preamp {
    settings: Arc<PreampSettings>,
    enabled: bool,
}

impl Preamp {
    /// Create a preamp at unity gain.
    pub fn new(_sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(PreampSettings::default()),
            enabled: true,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &PreampSettings {
        &self.settings
    }
}

impl Effect for Preamp {
    fn kind(&self) -> EffectKind {
        EffectKind::Preamp
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

    fn process(&mut self, buffer: &mut [f32], _channels: usize) {
        if !self.enabled {
            return;
        }
        let gain = db_to_linear(self.settings.gain_db.get());
        if (gain - 1.0).abs() < 1e-3 {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = hard_clip(*sample * gain, 2.0);
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
