//! Benchmark suite for feature extraction throughput.
//!
//! Run with: `cargo bench -p feature-engine`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use feature_engine::{DwtAnalyzer, FftAnalyzer, FeatureExtractor, TimeDomainFeatures, WaveletFeatures};
use ndarray::Array1;
use signal_processing::{window_signal, DEFAULT_HOP_SIZE, DEFAULT_WINDOW_SIZE, SAMPLE_RATE};
use std::f64::consts::PI;

/// Bearing-like test signal: shaft harmonic, a resonance, and periodic impacts
fn synthetic_signal(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            let impact = if i % 1600 < 8 { 3.0 } else { 0.0 };
            (2.0 * PI * 60.0 * t).sin() + 0.3 * (2.0 * PI * 3200.0 * t).sin() + impact
        })
        .collect()
}

fn bench_single_window(c: &mut Criterion) {
    let window = Array1::from(synthetic_signal(DEFAULT_WINDOW_SIZE));
    let fft = FftAnalyzer::new(SAMPLE_RATE);
    let dwt = DwtAnalyzer::default();

    let mut group = c.benchmark_group("single_window");
    group.bench_function("time_domain", |b| {
        b.iter(|| TimeDomainFeatures::compute(black_box(window.view())))
    });
    group.bench_function("frequency_domain", |b| {
        let plan = fft.plan(DEFAULT_WINDOW_SIZE);
        b.iter(|| fft.analyze_with(plan.as_ref(), black_box(window.view())))
    });
    group.bench_function("wavelet_domain", |b| {
        b.iter(|| WaveletFeatures::compute(&dwt, black_box(window.view())))
    });
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let extractor = FeatureExtractor::new(SAMPLE_RATE);

    let mut group = c.benchmark_group("batch_extraction");
    for seconds in [1usize, 5] {
        let signal = synthetic_signal(seconds * SAMPLE_RATE as usize);
        let windows = window_signal(&signal, DEFAULT_WINDOW_SIZE, DEFAULT_HOP_SIZE).unwrap();
        group.throughput(Throughput::Elements(windows.nrows() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(seconds), &windows, |b, w| {
            b.iter(|| extractor.extract(black_box(w.view())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_window, bench_batch);
criterion_main!(benches);
