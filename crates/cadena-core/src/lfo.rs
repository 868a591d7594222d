//! Low-frequency oscillator for modulation effects.
//!
//! Phase-accumulator LFO used by the chorus, flanger, phaser and tremolo.

use libm::sinf;

/// LFO waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoShape {
    /// Smooth sinusoidal modulation.
    #[default]
    Sine,
    /// Linear up/down ramp.
    Triangle,
}

/// Phase-accumulator low-frequency oscillator.
///
/// Output is bipolar in `[-1.0, 1.0]`; use [`next_unipolar`](Lfo::next_unipolar)
/// for `[0.0, 1.0]` sweeps.
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    phase_inc: f32,
    sample_rate: f32,
    shape: LfoShape,
}

impl Lfo {
    /// Create an LFO at the given rate.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
            sample_rate,
            shape: LfoShape::Sine,
        }
    }

    /// Set the oscillation frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz / self.sample_rate;
    }

    /// Set the waveform.
    pub fn set_shape(&mut self, shape: LfoShape) {
        self.shape = shape;
    }

    /// Offset the phase (0.0 to 1.0) - for spreading multi-channel voices.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase.clamp(0.0, 1.0);
    }

    /// Update the sample rate, preserving the frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.phase_inc * self.sample_rate;
        self.sample_rate = sample_rate;
        self.phase_inc = freq / sample_rate;
    }

    /// Rewind the phase to zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Next bipolar value in `[-1.0, 1.0]`.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let output = match self.shape {
            LfoShape::Sine => sinf(self.phase * core::f32::consts::TAU),
            LfoShape::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
        };

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        output
    }

    /// Next unipolar value in `[0.0, 1.0]`.
    #[inline]
    pub fn next_unipolar(&mut self) -> f32 {
        (self.next() + 1.0) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_stays_in_range() {
        let mut lfo = Lfo::new(48000.0, 2.0);
        for _ in 0..48000 {
            let v = lfo.next();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn triangle_hits_extremes() {
        let mut lfo = Lfo::new(1000.0, 1.0);
        lfo.set_shape(LfoShape::Triangle);
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..1000 {
            let v = lfo.next();
            min = min.min(v);
            max = max.max(v);
        }
        assert!(min < -0.99 && max > 0.99, "min {min}, max {max}");
    }

    #[test]
    fn frequency_sets_period() {
        // A 10 Hz LFO at 1 kHz sample rate wraps every 100 samples.
        let mut lfo = Lfo::new(1000.0, 10.0);
        let first = lfo.next();
        for _ in 0..99 {
            lfo.next();
        }
        let wrapped = lfo.next();
        assert!((first - wrapped).abs() < 1e-3);
    }

    #[test]
    fn unipolar_range() {
        let mut lfo = Lfo::new(48000.0, 5.0);
        for _ in 0..20000 {
            let v = lfo.next_unipolar();
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
