//! Settings aggregates - one ordered parameter collection per effect.
//!
//! A [`SettingsBank`] is the complete user-facing state of one effect. The
//! order of [`params`](SettingsBank::params) is stable for a given concrete
//! type and **is** the binary wire order: serialization writes the raw
//! values positionally, with no self-description. Reordering or removing a
//! parameter in a shipped settings type breaks every saved rack file.
//!
//! Aggregates support bulk reset, whole-state snapshots, and named
//! [`FactoryPreset`]s. Presets are not stored on the aggregate - they are
//! rebuilt on every `presets()` call, which keeps them stateless and cheap.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::param::{Param, ParamValue};

/// An effect's named, ordered collection of parameters.
///
/// Implementations list each parameter field exactly once in
/// [`params`](Self::params); everything else is derived from that order.
/// Parameters are atomics, so the whole trait works through `&self` and a
/// bank can be shared between the audio and control threads behind an
/// `Arc` with no locking.
pub trait SettingsBank: Send + Sync {
    /// Display name of the owning effect type.
    fn effect_name(&self) -> &'static str;

    /// All parameters, in declaration order (the serialization order).
    fn params(&self) -> Vec<&dyn Param>;

    /// Named factory presets for this effect. Rebuilt on every call.
    fn presets(&self) -> Vec<FactoryPreset> {
        Vec::new()
    }

    /// Number of parameters.
    fn param_count(&self) -> usize {
        self.params().len()
    }

    /// Reset every parameter to its default, in order.
    fn reset_all(&self) {
        for param in self.params() {
            param.reset();
        }
    }

    /// Capture the current value of every parameter, in order.
    fn snapshot(&self) -> Vec<ParamValue> {
        self.params().iter().map(|p| p.value()).collect()
    }

    /// Apply a snapshot onto this aggregate.
    ///
    /// Returns `false` (and applies nothing) if the length does not match
    /// the parameter count.
    fn apply(&self, values: &[ParamValue]) -> bool {
        let params = self.params();
        if values.len() != params.len() {
            return false;
        }
        for (param, value) in params.iter().zip(values) {
            param.set_value(*value);
        }
        true
    }

    /// Element-wise exact comparison against a snapshot.
    ///
    /// Floats compare bit-for-bit: this is the preset-matching contract,
    /// where only an untouched value counts as a match.
    fn matches(&self, values: &[ParamValue]) -> bool {
        let params = self.params();
        params.len() == values.len()
            && params.iter().zip(values).all(|(p, v)| p.value() == *v)
    }
}

/// An immutable named parameter snapshot.
///
/// Binds a name to one value per parameter of a specific settings type.
/// Applying a preset writes the values through the aggregate's clamped
/// setters, so a preset can never push a parameter out of range.
#[derive(Debug, Clone)]
pub struct FactoryPreset {
    /// Preset display name.
    pub name: &'static str,
    /// One value per parameter, in the aggregate's declaration order.
    pub values: Vec<ParamValue>,
}

impl FactoryPreset {
    /// Create a preset from a name and value list.
    pub fn new(name: &'static str, values: impl Into<Vec<ParamValue>>) -> Self {
        Self {
            name,
            values: values.into(),
        }
    }

    /// Apply this preset onto a settings aggregate.
    pub fn apply(&self, bank: &dyn SettingsBank) -> bool {
        bank.apply(&self.values)
    }

    /// Check whether the aggregate currently holds exactly these values.
    pub fn matches(&self, bank: &dyn SettingsBank) -> bool {
        bank.matches(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{BoolParam, FloatParam, IntParam, ParamUnit};
    #[cfg(not(feature = "std"))]
    use alloc::vec;

    struct TestSettings {
        drive: FloatParam,
        bits: IntParam,
        bypass_tone: BoolParam,
    }

    impl Default for TestSettings {
        fn default() -> Self {
            Self {
                drive: FloatParam::new("Drive", 12.0, 0.0, 40.0, ParamUnit::Decibels),
                bits: IntParam::new("Bits", 8, 1, 16, ParamUnit::None),
                bypass_tone: BoolParam::new("Bypass Tone", false),
            }
        }
    }

    impl SettingsBank for TestSettings {
        fn effect_name(&self) -> &'static str {
            "Test"
        }

        fn params(&self) -> Vec<&dyn Param> {
            vec![&self.drive, &self.bits, &self.bypass_tone]
        }

        fn presets(&self) -> Vec<FactoryPreset> {
            vec![FactoryPreset::new(
                "Crushed",
                vec![
                    ParamValue::Float(30.0),
                    ParamValue::Int(4),
                    ParamValue::Bool(true),
                ],
            )]
        }
    }

    #[test]
    fn params_order_is_stable() {
        let s = TestSettings::default();
        let names: Vec<_> = s.params().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Drive", "Bits", "Bypass Tone"]);
    }

    #[test]
    fn snapshot_roundtrip() {
        let a = TestSettings::default();
        a.drive.set(20.0);
        a.bits.set(4);
        a.bypass_tone.set(true);

        let b = TestSettings::default();
        assert!(b.apply(&a.snapshot()));
        assert_eq!(b.drive.get(), 20.0);
        assert_eq!(b.bits.get(), 4);
        assert!(b.bypass_tone.get());
    }

    #[test]
    fn apply_rejects_length_mismatch() {
        let s = TestSettings::default();
        assert!(!s.apply(&[ParamValue::Float(1.0)]));
        // Nothing changed
        assert_eq!(s.drive.get(), 12.0);
    }

    #[test]
    fn reset_all_restores_defaults() {
        let s = TestSettings::default();
        s.drive.set(40.0);
        s.bits.set(1);
        s.bypass_tone.set(true);
        s.reset_all();
        assert_eq!(s.drive.get(), 12.0);
        assert_eq!(s.bits.get(), 8);
        assert!(!s.bypass_tone.get());
    }

    #[test]
    fn preset_apply_and_match() {
        let s = TestSettings::default();
        let presets = s.presets();
        assert_eq!(presets.len(), 1);
        assert!(!presets[0].matches(&s));

        assert!(presets[0].apply(&s));
        assert_eq!(s.drive.get(), 30.0);
        assert_eq!(s.bits.get(), 4);
        assert!(presets[0].matches(&s));

        // Any change breaks the exact match
        s.drive.set(30.0 + 1e-4);
        assert!(!presets[0].matches(&s));
    }
}
