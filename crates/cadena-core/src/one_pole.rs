//! First-order IIR filters.
//!
//! The lowpass uses the recurrence `y[n] = y[n-1] + alpha * (x[n] - y[n-1])`
//! with `alpha = w / (w + 1)`, `w = 2*pi*f_c / sample_rate` - the bilinear
//! form of an analog RC stage. 6 dB/octave per pole; cascade four for the
//! -24 dB/octave "warmth" rolloff.
//!
//! The highpass is the companion `y[n] = alpha * (y[n-1] + x[n] - x[n-1])`.

use crate::math::flush_denormal;

/// One-pole (6 dB/oct) lowpass filter.
#[derive(Debug, Clone, Default)]
pub struct OnePoleLp {
    alpha: f32,
    state: f32,
}

impl OnePoleLp {
    /// Create a lowpass with the given cutoff.
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        let mut lp = Self {
            alpha: 1.0,
            state: 0.0,
        };
        lp.set_cutoff(sample_rate, cutoff_hz);
        lp
    }

    /// Recompute the coefficient for a new cutoff and/or sample rate.
    ///
    /// `alpha = w / (w + 1)` with `w = 2*pi*f_c / sample_rate`. Cutoffs at
    /// or above Nyquist push alpha toward 1 (no filtering).
    pub fn set_cutoff(&mut self, sample_rate: f32, cutoff_hz: f32) {
        let omega = core::f32::consts::TAU * cutoff_hz / sample_rate;
        self.alpha = omega / (omega + 1.0);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(self.state + self.alpha * (input - self.state));
        self.state
    }

    /// Clear the filter state.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// One-pole (6 dB/oct) highpass filter.
#[derive(Debug, Clone, Default)]
pub struct OnePoleHp {
    alpha: f32,
    prev_in: f32,
    state: f32,
}

impl OnePoleHp {
    /// Create a highpass with the given cutoff.
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        let mut hp = Self {
            alpha: 0.0,
            prev_in: 0.0,
            state: 0.0,
        };
        hp.set_cutoff(sample_rate, cutoff_hz);
        hp
    }

    /// Recompute the coefficient: `alpha = 1 / (w + 1)`.
    pub fn set_cutoff(&mut self, sample_rate: f32, cutoff_hz: f32) {
        let omega = core::f32::consts::TAU * cutoff_hz / sample_rate;
        self.alpha = 1.0 / (omega + 1.0);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(self.alpha * (self.state + input - self.prev_in));
        self.prev_in = input;
        self.state
    }

    /// Clear the filter state.
    pub fn reset(&mut self) {
        self.prev_in = 0.0;
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowpass_passes_dc() {
        let mut lp = OnePoleLp::new(48000.0, 1000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = lp.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3, "DC should pass, got {out}");
    }

    #[test]
    fn lowpass_attenuates_alternating_signal() {
        let mut lp = OnePoleLp::new(48000.0, 500.0);
        // Nyquist-rate alternation is far above the cutoff
        let mut peak = 0.0f32;
        for i in 0..4800 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = lp.process(x);
            if i > 1000 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 0.1, "HF should be attenuated, peak {peak}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut hp = OnePoleHp::new(48000.0, 100.0);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = hp.process(1.0);
        }
        assert!(out.abs() < 1e-3, "DC should be blocked, got {out}");
    }

    #[test]
    fn reset_clears_state() {
        let mut lp = OnePoleLp::new(48000.0, 1000.0);
        for _ in 0..100 {
            lp.process(1.0);
        }
        lp.reset();
        assert_eq!(lp.process(0.0), 0.0);
    }

    #[test]
    fn four_pole_cascade_is_steeper() {
        // A 4-pole cascade must attenuate more than a single pole at the
        // same frequency above cutoff.
        let mut single = OnePoleLp::new(48000.0, 200.0);
        let mut cascade = [
            OnePoleLp::new(48000.0, 200.0),
            OnePoleLp::new(48000.0, 200.0),
            OnePoleLp::new(48000.0, 200.0),
            OnePoleLp::new(48000.0, 200.0),
        ];
        let mut peak_single = 0.0f32;
        let mut peak_cascade = 0.0f32;
        for i in 0..9600 {
            // ~4 kHz sine, well above cutoff
            let x = libm::sinf(core::f32::consts::TAU * 4000.0 * i as f32 / 48000.0);
            let s = single.process(x);
            let mut c = x;
            for lp in &mut cascade {
                c = lp.process(c);
            }
            if i > 2400 {
                peak_single = peak_single.max(s.abs());
                peak_cascade = peak_cascade.max(c.abs());
            }
        }
        assert!(
            peak_cascade < peak_single * 0.1,
            "cascade {peak_cascade} vs single {peak_single}"
        );
    }
}
