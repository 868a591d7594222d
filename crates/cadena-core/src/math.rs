//! DSP math utilities shared by every effect.
//!
//! Allocation-free, `no_std`-friendly helpers: level conversions,
//! waveshaping, denormal protection and wet/dry blending.

use libm::{expf, logf, tanhf};

/// Convert decibels to linear gain (0 dB -> 1.0, -6 dB -> ~0.5).
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Input is floored at 1e-10 to keep the
/// log finite for silent signals.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Tanh soft clip - smooth saturation approaching +/-1 asymptotically.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Cubic soft clip: `1.5x - 0.5x^3` inside [-1, 1], flat outside.
///
/// Cheaper than tanh and produces the classic polynomial odd-harmonic
/// spectrum. The constants place unity slope at zero and zero slope at the
/// clip points.
#[inline]
pub fn soft_clip_cubic(x: f32) -> f32 {
    if x >= 1.0 {
        1.0
    } else if x <= -1.0 {
        -1.0
    } else {
        1.5 * x - 0.5 * x * x * x
    }
}

/// Hard clip to `[-limit, limit]` - the safety net after every shaper.
#[inline]
pub fn hard_clip(x: f32, limit: f32) -> f32 {
    x.clamp(-limit, limit)
}

/// Flush subnormal floats to zero.
///
/// Subnormals (below ~1e-38) stall the FPU on most architectures. Feedback
/// paths that decay toward silence pass their state through this; the
/// 1e-20 threshold leaves a wide margin above the subnormal range.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals.
///
/// Equivalent to `dry * (1 - mix) + wet * mix` with one fewer multiply.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry + (wet - dry) * mix
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_roundtrip() {
        for &db in &[-60.0, -6.0, 0.0, 6.0, 20.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} -> {back}");
        }
    }

    #[test]
    fn db_known_values() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-3);
        assert!((db_to_linear(6.0206) - 2.0).abs() < 2e-3);
    }

    #[test]
    fn cubic_clip_shape() {
        assert_eq!(soft_clip_cubic(0.0), 0.0);
        assert_eq!(soft_clip_cubic(1.0), 1.0);
        assert_eq!(soft_clip_cubic(-1.0), -1.0);
        assert_eq!(soft_clip_cubic(5.0), 1.0);
        assert_eq!(soft_clip_cubic(-5.0), -1.0);
        // Unity slope near zero
        let y = soft_clip_cubic(0.01);
        assert!((y - 0.015).abs() < 1e-4);
    }

    #[test]
    fn soft_clip_bounded() {
        assert!(soft_clip(10.0) < 1.0);
        assert!(soft_clip(-10.0) > -1.0);
    }

    #[test]
    fn denormal_flush() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(-1e-30), 0.0);
        assert_eq!(flush_denormal(1e-10), 1e-10);
        assert_eq!(flush_denormal(0.5), 0.5);
    }

    #[test]
    fn mix_endpoints() {
        assert_eq!(wet_dry_mix(0.25, 0.75, 0.0), 0.25);
        assert_eq!(wet_dry_mix(0.25, 0.75, 1.0), 0.75);
        assert_eq!(wet_dry_mix(0.0, 1.0, 0.5), 0.5);
    }
}
