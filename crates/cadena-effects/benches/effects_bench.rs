//! Criterion benchmarks for cadena effects
//!
//! Run with: cargo bench -p cadena-effects
#![allow(missing_docs)]

use cadena_core::Effect;
use cadena_effects::{Chorus, Compressor, Delay, Distortion, Equalizer, Limiter, Reverb};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const SAMPLE_RATE: f32 = 48000.0;

fn stereo_block(frames: usize) -> Vec<f32> {
    (0..frames * 2)
        .map(|i| {
            let t = (i / 2) as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_effect<E: Effect>(c: &mut Criterion, name: &str, mut effect: E) {
    let mut group = c.benchmark_group(name);
    for &frames in &[128usize, 512] {
        let input = stereo_block(frames);
        group.bench_with_input(BenchmarkId::new("stereo", frames), &frames, |b, _| {
            b.iter(|| {
                let mut buffer = input.clone();
                effect.process(black_box(&mut buffer), 2);
                black_box(&buffer);
            });
        });
    }
    group.finish();
}

fn bench_all(c: &mut Criterion) {
    bench_effect(c, "Distortion", Distortion::new(SAMPLE_RATE));
    bench_effect(c, "Equalizer", {
        let eq = Equalizer::new(SAMPLE_RATE);
        eq.settings().bands[4].set(6.0);
        eq
    });
    bench_effect(c, "Chorus", Chorus::new(SAMPLE_RATE));
    bench_effect(c, "Delay", Delay::new(SAMPLE_RATE));
    bench_effect(c, "Reverb", Reverb::new(SAMPLE_RATE));
    bench_effect(c, "Compressor", Compressor::new(SAMPLE_RATE));
    bench_effect(c, "Limiter", Limiter::new(SAMPLE_RATE));
}

fn bench_bypass(c: &mut Criterion) {
    // The bypass contract promises near-zero cost for disabled effects
    let mut reverb = Reverb::new(SAMPLE_RATE);
    reverb.set_enabled(false);
    let input = stereo_block(512);
    c.bench_function("Reverb/bypassed", |b| {
        b.iter(|| {
            let mut buffer = input.clone();
            reverb.process(black_box(&mut buffer), 2);
            black_box(&buffer);
        });
    });
}

criterion_group!(benches, bench_all, bench_bypass);
criterion_main!(benches);
