//! Cubic-polynomial waveshaping distortion.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, FloatParam, Param, ParamUnit, SettingsBank, db_to_linear, hard_clip,
    soft_clip_cubic, wet_dry_mix,
};

/// Parameters for [`Distortion`].
#[derive(Debug)]
pub struct DistortionSettings {
    /// Input drive in dB.
    pub drive_db: FloatParam,
    /// Post-shaper level in percent.
    pub level: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for DistortionSettings {
    fn default() -> Self {
        Self {
            drive_db: FloatParam::new("Drive", 12.0, 0.0, 40.0, ParamUnit::Decibels),
            level: FloatParam::new("Level", 80.0, 0.0, 100.0, ParamUnit::Percent),
            wet: FloatParam::new("Wet", 100.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for DistortionSettings {
    fn effect_name(&self) -> &'static str {
        "Distortion"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.drive_db, &self.level, &self.wet]
    }

    fn presets(&self) -> Vec<cadena_core::FactoryPreset> {
        use cadena_core::{FactoryPreset, ParamValue};
        vec![
            FactoryPreset::new(
                "Crunch",
                vec![
                    ParamValue::Float(18.0),
                    ParamValue::Float(70.0),
                    ParamValue::Float(100.0),
                ],
            ),
            FactoryPreset::new(
                "Fuzz",
                vec![
                    ParamValue::Float(36.0),
                    ParamValue::Float(60.0),
                    ParamValue::Float(100.0),
                ],
            ),
        ]
    }
}

/// Hard-driving cubic waveshaper.
///
/// Signal path: drive gain -> `1.5x - 0.5x^3` shaper -> level -> wet/dry
/// mix -> hard clamp to [-1, 1]. Stateless per sample, so it processes
/// every interleaved float without caring about channel layout.
#[derive(Debug)]
pub struct Distortion {
    settings: Arc<DistortionSettings>,
    enabled: bool,
}

impl Distortion {
    /// Create a distortion stage.
    pub fn new(_sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(DistortionSettings::default()),
            enabled: true,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &DistortionSettings {
        &self.settings
    }
}

impl Effect for Distortion {
    fn kind(&self) -> EffectKind {
        EffectKind::Distortion
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
        let wet = self.settings.wet.get() / 100.0;
        if wet <= 0.001 {
            return;
        }
        let drive = db_to_linear(self.settings.drive_db.get());
        let level = self.settings.level.get() / 100.0;

        for sample in buffer.iter_mut() {
            let dry = *sample;
            let shaped = soft_clip_cubic(dry * drive) * level;
            *sample = hard_clip(wet_dry_mix(dry, shaped, wet), 1.0);
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
