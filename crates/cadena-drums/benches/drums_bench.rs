//! Criterion benchmarks for the drum voices
//!
//! Run with: cargo bench -p cadena-drums
#![allow(missing_docs)]

use cadena_core::Effect;
use cadena_drums::{Cymbal, HiHat, KickDrum, SnareDrum, TomDrum};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_voice<E: Effect>(c: &mut Criterion, name: &str, mut effect: E, trigger: impl Fn(&mut E)) {
    c.bench_function(name, |b| {
        b.iter(|| {
            trigger(&mut effect);
            let mut buffer = vec![0.0f32; 1024];
            effect.process(black_box(&mut buffer), 2);
            black_box(&buffer);
        });
    });
}

fn bench_drums(c: &mut Criterion) {
    bench_voice(c, "KickDrum/512f", KickDrum::new(48000.0), |k| {
        k.settings().trigger.set(true);
    });
    bench_voice(c, "SnareDrum/512f", SnareDrum::new(48000.0), |s| {
        s.settings().trigger.set(true);
    });
    bench_voice(c, "HiHat/512f", HiHat::new(48000.0), |h| {
        h.settings().trigger.set(true);
    });
    bench_voice(c, "TomDrum/512f", TomDrum::new(48000.0), |t| {
        t.settings().trigger.set(true);
    });
    bench_voice(c, "Cymbal/512f", Cymbal::new(48000.0), |cy| {
        cy.settings().trigger.set(true);
    });
}

criterion_group!(benches, bench_drums);
criterion_main!(benches);
