//! Property-based tests shared by every effect in this crate.
//!
//! The load-bearing invariant is bypass idempotence: a disabled effect
//! must leave the buffer bit-for-bit untouched for any channel count and
//! buffer length. Racks rely on this for near-zero-cost bypass.

use cadena_core::Effect;
use cadena_effects::{
    AutoWah, Bitcrusher, Chorus, Compressor, Delay, Distortion, Equalizer, Flanger, Limiter,
    LoFi, NoiseGate, Overdrive, Phaser, Preamp, Reverb, RingModulator, Tone, Tremolo,
    VoiceModulator, Warmth,
};
use proptest::prelude::*;

fn all_effects(sample_rate: f32) -> Vec<Box<dyn Effect>> {
    vec![
        Box::new(Preamp::new(sample_rate)),
        Box::new(Distortion::new(sample_rate)),
        Box::new(Overdrive::new(sample_rate)),
        Box::new(Warmth::new(sample_rate)),
        Box::new(LoFi::new(sample_rate)),
        Box::new(Bitcrusher::new(sample_rate)),
        Box::new(Equalizer::new(sample_rate)),
        Box::new(Tone::new(sample_rate)),
        Box::new(Chorus::new(sample_rate)),
        Box::new(Flanger::new(sample_rate)),
        Box::new(Phaser::new(sample_rate)),
        Box::new(Tremolo::new(sample_rate)),
        Box::new(RingModulator::new(sample_rate)),
        Box::new(VoiceModulator::new(sample_rate)),
        Box::new(Delay::new(sample_rate)),
        Box::new(Reverb::new(sample_rate)),
        Box::new(Compressor::new(sample_rate)),
        Box::new(Limiter::new(sample_rate)),
        Box::new(NoiseGate::new(sample_rate)),
        Box::new(AutoWah::new(sample_rate)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Disabled effects are bit-exact no-ops for channel counts 1-8.
    #[test]
    fn bypass_is_idempotent(
        channels in 1usize..=8,
        frames in 1usize..=64,
        seed in any::<u64>(),
    ) {
        let mut state = seed;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 32) as f32 / (1u64 << 31) as f32) - 1.0
        };
        let buffer: Vec<f32> = (0..frames * channels).map(|_| next()).collect();

        for mut effect in all_effects(48000.0) {
            effect.set_enabled(false);
            let mut processed = buffer.clone();
            effect.process(&mut processed, channels);
            prop_assert_eq!(
                &processed,
                &buffer,
                "disabled {:?} modified the buffer",
                effect.kind()
            );
        }
    }

    /// Enabled effects keep the signal finite for hot but bounded input.
    #[test]
    fn enabled_output_is_finite(
        channels in 1usize..=4,
        seed in any::<u64>(),
    ) {
        let mut state = seed | 1;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 32) as f32 / (1u64 << 31) as f32) - 1.0
        };
        let buffer: Vec<f32> = (0..256 * channels).map(|_| next()).collect();

        for mut effect in all_effects(48000.0) {
            let mut processed = buffer.clone();
            effect.process(&mut processed, channels);
            prop_assert!(
                processed.iter().all(|s| s.is_finite()),
                "{:?} produced non-finite output",
                effect.kind()
            );
        }
    }

    /// Channel-count changes between calls never panic and never corrupt
    /// the output into non-finite values.
    #[test]
    fn channel_count_changes_are_tolerated(
        first in 1usize..=8,
        second in 1usize..=8,
    ) {
        for mut effect in all_effects(44100.0) {
            let mut a = vec![0.5f32; 64 * first];
            effect.process(&mut a, first);
            let mut b = vec![0.5f32; 64 * second];
            effect.process(&mut b, second);
            prop_assert!(b.iter().all(|s| s.is_finite()), "{:?}", effect.kind());
        }
    }
}

#[test]
fn every_effect_reports_its_kind_and_settings() {
    for effect in all_effects(48000.0) {
        let settings = effect.settings();
        assert!(!settings.effect_name().is_empty());
        assert!(settings.param_count() > 0, "{:?} has no params", effect.kind());
        // Snapshot/apply round-trips on the same instance
        let snap = settings.snapshot();
        assert!(settings.apply(&snap));
        assert!(settings.matches(&snap));
    }
}

#[test]
fn set_sample_rate_then_process_is_safe() {
    for mut effect in all_effects(44100.0) {
        let mut buffer = vec![0.25f32; 512];
        effect.process(&mut buffer, 2);
        effect.set_sample_rate(96000.0);
        let mut buffer = vec![0.25f32; 512];
        effect.process(&mut buffer, 2);
        assert!(buffer.iter().all(|s| s.is_finite()), "{:?}", effect.kind());
    }
}
