//! Atomic, bounded parameters - the unit of user-controllable state.
//!
//! Every knob an effect exposes is one of [`FloatParam`], [`IntParam`] or
//! [`BoolParam`]: a named value with a default and a range, stored in an
//! atomic so a control thread can write while the audio thread reads,
//! without any lock. Values are clamped to `[min, max]` on every set -
//! a parameter can never hold an out-of-range value.
//!
//! The concurrency contract is single-writer/single-reader with `Relaxed`
//! ordering: a knob turn lands on the audio thread "soon", and no ordering
//! is guaranteed between concurrent writers. That is all an effects rack
//! needs, and it keeps the audio path free of fences.
//!
//! ```rust
//! use cadena_core::{FloatParam, ParamUnit};
//!
//! let drive = FloatParam::new("Drive", 12.0, 0.0, 40.0, ParamUnit::Decibels);
//! drive.set(100.0);
//! assert_eq!(drive.get(), 40.0); // clamped to max
//! ```

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB) - gain, threshold, level.
    Decibels,
    /// Hertz (Hz) - frequencies and LFO rates.
    Hertz,
    /// Milliseconds (ms) - delay, attack, release times.
    Milliseconds,
    /// Percentage (%) - mix, depth, feedback.
    Percent,
    /// Ratio (n:1) - compressor ratios.
    Ratio,
    /// No unit - dimensionless parameters.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Percent => "%",
            ParamUnit::Ratio => ":1",
            ParamUnit::None => "",
        }
    }
}

/// A type-erased parameter value.
///
/// This is both the runtime scalar used for snapshots/presets and the wire
/// scalar: floats serialize as 4 little-endian bytes, ints as 4, bools as 1.
/// Equality is **exact** - preset matching intentionally uses bitwise float
/// comparison, so only an untouched parameter matches its preset value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// 32-bit float value.
    Float(f32),
    /// 32-bit signed integer value.
    Int(i32),
    /// Boolean value.
    Bool(bool),
}

impl ParamValue {
    /// Coerce to float (ints cast, bools map to 0.0/1.0).
    #[inline]
    pub fn as_float(self) -> f32 {
        match self {
            ParamValue::Float(v) => v,
            ParamValue::Int(v) => v as f32,
            ParamValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Coerce to integer (floats truncate, bools map to 0/1).
    #[inline]
    pub fn as_int(self) -> i32 {
        match self {
            ParamValue::Float(v) => v as i32,
            ParamValue::Int(v) => v,
            ParamValue::Bool(b) => i32::from(b),
        }
    }

    /// Coerce to bool (anything non-zero is true).
    #[inline]
    pub fn as_bool(self) -> bool {
        match self {
            ParamValue::Float(v) => v != 0.0,
            ParamValue::Int(v) => v != 0,
            ParamValue::Bool(b) => b,
        }
    }
}

/// Object-safe access to any parameter type.
///
/// Settings aggregates hand out `&dyn Param` lists in declaration order;
/// serialization, presets and generic UIs all go through this trait.
pub trait Param: Send + Sync {
    /// Parameter display name.
    fn name(&self) -> &'static str;

    /// Display unit.
    fn unit(&self) -> ParamUnit;

    /// Current value.
    fn value(&self) -> ParamValue;

    /// Default value.
    fn default_value(&self) -> ParamValue;

    /// Set the value, coercing the variant and clamping to the valid range.
    fn set_value(&self, value: ParamValue);

    /// Reset to the default value.
    fn reset(&self) {
        self.set_value(self.default_value());
    }
}

/// Atomic float parameter with range clamping.
///
/// The value is stored as raw bits in an `AtomicU32`, so reads and writes
/// are single lock-free loads/stores.
#[derive(Debug)]
pub struct FloatParam {
    name: &'static str,
    unit: ParamUnit,
    min: f32,
    max: f32,
    default: f32,
    bits: AtomicU32,
}

impl FloatParam {
    /// Create a parameter. `default` must lie within `[min, max]`.
    pub const fn new(
        name: &'static str,
        default: f32,
        min: f32,
        max: f32,
        unit: ParamUnit,
    ) -> Self {
        Self {
            name,
            unit,
            min,
            max,
            default,
            bits: AtomicU32::new(default.to_bits()),
        }
    }

    /// Read the current value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Store a new value, clamped to `[min, max]`.
    #[inline]
    pub fn set(&self, value: f32) {
        let clamped = value.clamp(self.min, self.max);
        self.bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    /// Minimum allowed value.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Maximum allowed value.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Default value.
    pub fn default(&self) -> f32 {
        self.default
    }
}

impl Param for FloatParam {
    fn name(&self) -> &'static str {
        self.name
    }

    fn unit(&self) -> ParamUnit {
        self.unit
    }

    fn value(&self) -> ParamValue {
        ParamValue::Float(self.get())
    }

    fn default_value(&self) -> ParamValue {
        ParamValue::Float(self.default)
    }

    fn set_value(&self, value: ParamValue) {
        self.set(value.as_float());
    }
}

/// Atomic integer parameter with range clamping.
#[derive(Debug)]
pub struct IntParam {
    name: &'static str,
    unit: ParamUnit,
    min: i32,
    max: i32,
    default: i32,
    value: AtomicI32,
}

impl IntParam {
    /// Create a parameter. `default` must lie within `[min, max]`.
    pub const fn new(
        name: &'static str,
        default: i32,
        min: i32,
        max: i32,
        unit: ParamUnit,
    ) -> Self {
        Self {
            name,
            unit,
            min,
            max,
            default,
            value: AtomicI32::new(default),
        }
    }

    /// Read the current value.
    #[inline]
    pub fn get(&self) -> i32 {
        self.value.load(Ordering::Relaxed)
    }

    /// Store a new value, clamped to `[min, max]`.
    #[inline]
    pub fn set(&self, value: i32) {
        self.value
            .store(value.clamp(self.min, self.max), Ordering::Relaxed);
    }

    /// Minimum allowed value.
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Maximum allowed value.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Default value.
    pub fn default(&self) -> i32 {
        self.default
    }
}

impl Param for IntParam {
    fn name(&self) -> &'static str {
        self.name
    }

    fn unit(&self) -> ParamUnit {
        self.unit
    }

    fn value(&self) -> ParamValue {
        ParamValue::Int(self.get())
    }

    fn default_value(&self) -> ParamValue {
        ParamValue::Int(self.default)
    }

    fn set_value(&self, value: ParamValue) {
        self.set(value.as_int());
    }
}

/// Atomic boolean parameter.
#[derive(Debug)]
pub struct BoolParam {
    name: &'static str,
    default: bool,
    value: AtomicBool,
}

impl BoolParam {
    /// Create a parameter with the given default.
    pub const fn new(name: &'static str, default: bool) -> Self {
        Self {
            name,
            default,
            value: AtomicBool::new(default),
        }
    }

    /// Read the current value.
    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Relaxed)
    }

    /// Store a new value.
    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Atomically read the flag and clear it if set.
    ///
    /// One-shot trigger semantics: returns `true` exactly once per set.
    /// Used by the drum voices to consume their "Trigger" parameter.
    #[inline]
    pub fn take(&self) -> bool {
        self.value.swap(false, Ordering::Relaxed)
    }

    /// Default value.
    pub fn default(&self) -> bool {
        self.default
    }
}

impl Param for BoolParam {
    fn name(&self) -> &'static str {
        self.name
    }

    fn unit(&self) -> ParamUnit {
        ParamUnit::None
    }

    fn value(&self) -> ParamValue {
        ParamValue::Bool(self.get())
    }

    fn default_value(&self) -> ParamValue {
        ParamValue::Bool(self.default)
    }

    fn set_value(&self, value: ParamValue) {
        self.set(value.as_bool());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_clamps_on_set() {
        let p = FloatParam::new("Mix", 0.5, 0.0, 1.0, ParamUnit::Percent);
        p.set(1e9);
        assert_eq!(p.get(), 1.0);
        p.set(-1e9);
        assert_eq!(p.get(), 0.0);
        p.set(0.25);
        assert_eq!(p.get(), 0.25);
    }

    #[test]
    fn float_default_and_reset() {
        let p = FloatParam::new("Drive", 12.0, 0.0, 40.0, ParamUnit::Decibels);
        assert_eq!(p.get(), 12.0);
        p.set(30.0);
        p.reset();
        assert_eq!(p.get(), 12.0);
    }

    #[test]
    fn int_clamps_on_set() {
        let p = IntParam::new("Bits", 8, 1, 16, ParamUnit::None);
        p.set(99);
        assert_eq!(p.get(), 16);
        p.set(-3);
        assert_eq!(p.get(), 1);
    }

    #[test]
    fn bool_take_is_one_shot() {
        let p = BoolParam::new("Trigger", false);
        p.set(true);
        assert!(p.take());
        assert!(!p.take());
        assert!(!p.get());
    }

    #[test]
    fn value_coercions() {
        assert_eq!(ParamValue::Int(3).as_float(), 3.0);
        assert_eq!(ParamValue::Float(2.9).as_int(), 2);
        assert!(ParamValue::Float(0.5).as_bool());
        assert!(!ParamValue::Int(0).as_bool());
        assert_eq!(ParamValue::Bool(true).as_float(), 1.0);
    }

    #[test]
    fn set_value_coerces_and_clamps() {
        let p = FloatParam::new("Mix", 0.5, 0.0, 1.0, ParamUnit::Percent);
        p.set_value(ParamValue::Int(7));
        assert_eq!(p.get(), 1.0);
        p.set_value(ParamValue::Float(0.3));
        assert_eq!(p.get(), 0.3);
    }

    #[test]
    fn unit_suffixes() {
        assert_eq!(ParamUnit::Decibels.suffix(), " dB");
        assert_eq!(ParamUnit::Percent.suffix(), "%");
        assert_eq!(ParamUnit::None.suffix(), "");
    }

    #[test]
    fn exact_value_equality() {
        // Preset matching relies on exact float comparison.
        assert_eq!(ParamValue::Float(0.1), ParamValue::Float(0.1));
        assert_ne!(ParamValue::Float(0.1), ParamValue::Float(0.1 + 1e-7));
    }
}
