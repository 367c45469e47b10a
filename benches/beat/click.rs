//! Benchmarks for click buffer synthesis.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pendulum::{PcmBuffer, PcmFormat};

use crate::SAMPLE_RATES;

pub fn bench_click(c: &mut Criterion) {
    let mut group = c.benchmark_group("beat/click");

    for &rate in SAMPLE_RATES {
        let format = PcmFormat::new(rate, 2);

        group.bench_with_input(BenchmarkId::new("accent", rate), &rate, |b, _| {
            b.iter(|| PcmBuffer::accent_click(black_box(format)))
        });

        group.bench_with_input(BenchmarkId::new("regular", rate), &rate, |b, _| {
            b.iter(|| PcmBuffer::regular_click(black_box(format)))
        });
    }

    group.finish();
}
