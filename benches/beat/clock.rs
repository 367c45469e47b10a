//! Benchmarks for the work done on every poll of the beat loop.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pendulum::{BeatClock, BeatTracker, NeedleModel, TempoConfig};

pub fn bench_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("beat/clock");

    for &bpm in &[60.0, 120.0, 240.0] {
        let tempo = TempoConfig::new(bpm, 4).expect("valid tempo");
        let clock = BeatClock::new(&tempo).expect("valid clock");
        let needle = NeedleModel::default();

        group.bench_with_input(BenchmarkId::new("phase", bpm as u32), &bpm, |b, _| {
            b.iter(|| clock.phase_at_secs(black_box(123.456)))
        });

        // One full poll: phase, boundary check, needle
        group.bench_with_input(BenchmarkId::new("poll", bpm as u32), &bpm, |b, _| {
            let mut tracker = BeatTracker::new();
            let mut elapsed = 0.0;
            b.iter(|| {
                elapsed += 0.01;
                let phase = clock.phase_at_secs(black_box(elapsed));
                let crossing = tracker.observe(&phase);
                black_box((crossing, needle.angle_for(&phase)))
            })
        });
    }

    group.finish();
}
