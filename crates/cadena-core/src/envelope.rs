//! Envelope follower for amplitude tracking.
//!
//! Peak detector with asymmetric one-pole smoothing: a fast attack
//! coefficient while the signal rises, a slow release while it falls.
//! Drives the compressor, noise gate and auto-wah.

use libm::expf;

/// Peak envelope follower with separate attack and release times.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    attack_ms: f32,
    release_ms: f32,
    sample_rate: f32,
}

impl EnvelopeFollower {
    /// Create a follower with the given times.
    pub fn new(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            attack_ms,
            release_ms,
            sample_rate,
        };
        follower.recalculate();
        follower
    }

    /// Set attack time in milliseconds (floored at 0.1 ms).
    pub fn set_attack_ms(&mut self, ms: f32) {
        self.attack_ms = ms.max(0.1);
        self.recalculate();
    }

    /// Set release time in milliseconds (floored at 1 ms).
    pub fn set_release_ms(&mut self, ms: f32) {
        self.release_ms = ms.max(1.0);
        self.recalculate();
    }

    /// Update the sample rate and recompute both coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Advance the follower by one (rectified) input sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level = input.abs();
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * level;
        self.envelope
    }

    /// Current envelope level without advancing.
    #[inline]
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Reset the envelope to silence.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate(&mut self) {
        // coeff = exp(-1 / (time_ms * sr / 1000))
        self.attack_coeff = expf(-1.0 / (self.attack_ms * self.sample_rate / 1000.0));
        self.release_coeff = expf(-1.0 / (self.release_ms * self.sample_rate / 1000.0));
    }
}
