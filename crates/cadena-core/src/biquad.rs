//! Second-order IIR filter (biquad), Direct Form I.
//!
//! Coefficients come from the RBJ Audio EQ Cookbook. The equalizer and
//! tone stages run one [`Biquad`] per band per channel, each with its own
//! `x1/x2/y1/y2` history.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, sqrtf};

/// Normalized biquad coefficients (`a0` already divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    /// Feedforward coefficients.
    pub b0: f32,
    /// Feedforward z^-1.
    pub b1: f32,
    /// Feedforward z^-2.
    pub b2: f32,
    /// Feedback z^-1.
    pub a1: f32,
    /// Feedback z^-2.
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Unity passthrough.
    pub const IDENTITY: BiquadCoeffs = BiquadCoeffs {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalize raw cookbook coefficients by `a0`.
    pub fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let inv = 1.0 / a0;
        Self {
            b0: b0 * inv,
            b1: b1 * inv,
            b2: b2 * inv,
            a1: a1 * inv,
            a2: a2 * inv,
        }
    }
}

/// Direct Form I biquad with per-instance history.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

impl Biquad {
    /// Create a passthrough biquad.
    pub fn new() -> Self {
        Self {
            coeffs: BiquadCoeffs::IDENTITY,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Install new coefficients, keeping the history.
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }

    /// Clear the delay-line history without touching coefficients.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// RBJ peaking EQ coefficients.
///
/// `gain_db` boosts (positive) or cuts (negative) around `frequency` with
/// bandwidth set by `q`. `A = 10^(dB/40)` so boost and cut are symmetric.
pub fn peaking_coeffs(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> BiquadCoeffs {
    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_w = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    BiquadCoeffs::normalized(
        1.0 + alpha * a,
        -2.0 * cos_w,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_w,
        1.0 - alpha / a,
    )
}

/// RBJ low-shelf coefficients (shelf slope 1.0).
pub fn low_shelf_coeffs(frequency: f32, gain_db: f32, sample_rate: f32) -> BiquadCoeffs {
    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_w = cosf(omega);
    let sin_w = sinf(omega);
    let alpha = sin_w / 2.0 * sqrtf(2.0);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

    BiquadCoeffs::normalized(
        a * ((a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha),
        2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w),
        a * ((a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha),
        (a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha,
        -2.0 * ((a - 1.0) + (a + 1.0) * cos_w),
        (a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha,
    )
}

/// RBJ high-shelf coefficients (shelf slope 1.0).
pub fn high_shelf_coeffs(frequency: f32, gain_db: f32, sample_rate: f32) -> BiquadCoeffs {
    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_w = cosf(omega);
    let sin_w = sinf(omega);
    let alpha = sin_w / 2.0 * sqrtf(2.0);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

    BiquadCoeffs::normalized(
        a * ((a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha),
        -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w),
        a * ((a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha),
        (a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha,
        2.0 * ((a - 1.0) - (a + 1.0) * cos_w),
        (a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_response(coeffs: BiquadCoeffs, freq: f32, sample_rate: f32) -> f32 {
        // Run a sine through and measure steady-state peak amplitude.
        let mut bq = Biquad::new();
        bq.set_coeffs(coeffs);
        let mut peak = 0.0f32;
        let n = (sample_rate as usize) / 2;
        for i in 0..n {
            let x = sinf(2.0 * PI * freq * i as f32 / sample_rate);
            let y = bq.process(x);
            if i > n / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn identity_passes_through() {
        let mut bq = Biquad::new();
        for &x in &[0.5, -0.3, 1.0, 0.0] {
            assert_eq!(bq.process(x), x);
        }
    }

    #[test]
    fn peaking_boosts_at_center() {
        let sr = 48000.0;
        let coeffs = peaking_coeffs(1000.0, 1.0, 12.0, sr);
        let at_center = peak_response(coeffs, 1000.0, sr);
        // +12 dB ~= 3.98x
        assert!(
            (at_center - 3.98).abs() < 0.4,
            "expected ~3.98, got {at_center}"
        );
        // Far away the response returns to ~unity
        let far = peak_response(coeffs, 8000.0, sr);
        assert!((far - 1.0).abs() < 0.2, "expected ~1.0, got {far}");
    }

    #[test]
    fn peaking_cut_is_symmetric() {
        let sr = 48000.0;
        let cut = peaking_coeffs(1000.0, 1.0, -12.0, sr);
        let at_center = peak_response(cut, 1000.0, sr);
        assert!(
            (at_center - 0.251).abs() < 0.05,
            "expected ~0.25, got {at_center}"
        );
    }

    #[test]
    fn low_shelf_boosts_lows_only() {
        let sr = 48000.0;
        let coeffs = low_shelf_coeffs(200.0, 6.0, sr);
        let low = peak_response(coeffs, 50.0, sr);
        let high = peak_response(coeffs, 5000.0, sr);
        assert!(low > 1.6, "low band should be boosted, got {low}");
        assert!((high - 1.0).abs() < 0.2, "high band ~unity, got {high}");
    }

    #[test]
    fn high_shelf_boosts_highs_only() {
        let sr = 48000.0;
        let coeffs = high_shelf_coeffs(4000.0, 6.0, sr);
        let low = peak_response(coeffs, 200.0, sr);
        let high = peak_response(coeffs, 12000.0, sr);
        assert!((low - 1.0).abs() < 0.2, "low band ~unity, got {low}");
        assert!(high > 1.6, "high band should be boosted, got {high}");
    }

    #[test]
    fn reset_clears_history() {
        let mut bq = Biquad::new();
        bq.set_coeffs(peaking_coeffs(500.0, 1.0, 10.0, 48000.0));
        for _ in 0..64 {
            bq.process(1.0);
        }
        bq.reset();
        // With zeroed history the first output is exactly b0 * x
        let coeffs = peaking_coeffs(500.0, 1.0, 10.0, 48000.0);
        assert_eq!(bq.process(1.0), coeffs.b0);
    }
}
