//! Criterion benchmarks for the DTW distance kernels.
//!
//! The streaming replay queries the classifier hundreds of times per trial;
//! DTW dominates that cost, so the banded variant's speedup matters.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fallsense_knn::{dtw_distance, dtw_distance_banded};

fn sine(len: usize, phase: f32) -> Vec<f32> {
    (0..len).map(|i| (i as f32 * 0.05 + phase).sin()).collect()
}

fn bench_dtw(c: &mut Criterion) {
    let mut group = c.benchmark_group("dtw");

    for &len in &[200usize, 1000, 3000] {
        let a = sine(len, 0.0);
        let b = sine(len, 0.7);

        group.bench_with_input(BenchmarkId::new("full", len), &len, |bench, _| {
            bench.iter(|| dtw_distance(black_box(&a), black_box(&b)))
        });

        group.bench_with_input(BenchmarkId::new("band_50", len), &len, |bench, _| {
            bench.iter(|| dtw_distance_banded(black_box(&a), black_box(&b), 50))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dtw);
criterion_main!(benches);
