//! Criterion benchmarks for sweeplab-analysis components
//!
//! Run with: cargo bench -p sweeplab-analysis

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sweeplab_analysis::channel::{ChannelParams, channel_response};
use sweeplab_analysis::{
    SweepParams, compare::best_shift, deconvolve_noise, deconvolve_sweep, fft::convolve,
    integrate_group_delay, white_noise,
};

const SAMPLE_RATE: f64 = 48000.0;

/// Short room-like decay used as the system under test
fn generate_ir(size: usize) -> Vec<f64> {
    white_noise(size, 1.0, 0x1234_5678)
        .iter()
        .enumerate()
        .map(|(i, n)| n * (-(i as f64) / (size as f64 / 6.0)).exp())
        .collect()
}

// ============================================================================
// Synthesis benchmarks
// ============================================================================

fn bench_synthesize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sweep_Synthesize");
    group.sample_size(10);

    let durations = [0.5, 1.0, 2.0];

    for &duration in &durations {
        let params = SweepParams::new(duration, SAMPLE_RATE, 20.0, 20000.0);

        group.bench_with_input(BenchmarkId::from_parameter(duration), &duration, |b, _| {
            b.iter(|| {
                let result = black_box(&params).synthesize();
                black_box(result)
            })
        });
    }

    group.finish();
}

fn bench_group_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("GroupDelay_Integrate");

    let sizes = [4096, 65536, 262_144];

    for &size in &sizes {
        let delay: Vec<f64> = (0..size).map(|i| i as f64 * 0.5).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let result = integrate_group_delay(black_box(&delay));
                black_box(result)
            })
        });
    }

    group.finish();
}

// ============================================================================
// Deconvolution benchmarks
// ============================================================================

fn bench_deconvolve_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deconvolve_Sweep");
    group.sample_size(20);

    let durations = [0.5, 1.0];
    let ir = generate_ir(2048);

    for &duration in &durations {
        let sweep = SweepParams::new(duration, SAMPLE_RATE, 20.0, 20000.0)
            .synthesize()
            .unwrap();
        let response = convolve(&sweep.samples, &ir);

        group.bench_with_input(BenchmarkId::from_parameter(duration), &duration, |b, _| {
            b.iter(|| {
                let result = deconvolve_sweep(black_box(&response), &sweep.inverse);
                black_box(result)
            })
        });
    }

    group.finish();
}

fn bench_deconvolve_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deconvolve_Noise");

    let lengths = [16384, 65536];
    let ir = generate_ir(2048);

    for &length in &lengths {
        let excitation = white_noise(length, 1.0, 7);
        let response = convolve(&excitation, &ir);
        let fft_size = response.len();

        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, _| {
            b.iter(|| {
                let result = deconvolve_noise(black_box(&excitation), &response, fft_size);
                black_box(result)
            })
        });
    }

    group.finish();
}

// ============================================================================
// Compare module benchmarks
// ============================================================================

fn bench_best_shift(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compare_BestShift");

    let max_shifts = [50, 200];
    let measured = white_noise(48000, 0.5, 3);
    let reconstructed: Vec<f64> = measured[10..].to_vec();

    for &max_shift in &max_shifts {
        group.bench_with_input(BenchmarkId::from_parameter(max_shift), &max_shift, |b, _| {
            b.iter(|| {
                let result = best_shift(black_box(&reconstructed), &measured, max_shift);
                black_box(result)
            })
        });
    }

    group.finish();
}

// ============================================================================
// Channel module benchmarks
// ============================================================================

fn bench_channel_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("Channel_Response");

    let params = ChannelParams::new(16000.0);
    for &secs in &[4usize, 16] {
        let recording = white_noise(secs * 16000, 0.5, 11);
        group.bench_with_input(BenchmarkId::from_parameter(secs), &secs, |b, _| {
            b.iter(|| {
                let result = channel_response(black_box(&recording), &params);
                black_box(result)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_synthesize,
    bench_group_delay,
    bench_deconvolve_sweep,
    bench_deconvolve_noise,
    bench_best_shift,
    bench_channel_response,
);

criterion_main!(benches);
