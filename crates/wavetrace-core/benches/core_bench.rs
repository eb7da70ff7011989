//! Criterion benchmarks for wavetrace-core kernels
//!
//! Run with: cargo bench -p wavetrace-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wavetrace_core::{
    BandLimitedPower, Interpolation, Window, band_limited_power, reducers, repair_clipped, sliding,
    smooth_with_spline, zero_crossing_locations,
};

const RECORD_LENGTH: usize = 512;
const NUM_RECORDS: usize = 16;
const RADII: &[usize] = &[2, 8, 32];

/// Decaying echoes with a little deterministic noise, one record per row.
fn generate_records() -> Vec<f64> {
    let mut state: u32 = 0x1234_5678;
    (0..RECORD_LENGTH * NUM_RECORDS)
        .map(|i| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let noise = f64::from(state >> 8) / f64::from(1u32 << 24) - 0.5;
            let n = (i % RECORD_LENGTH) as f64;
            (-n / 128.0).exp() * (0.3 * n).sin() + 0.05 * noise
        })
        .collect()
}

fn bench_sliding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sliding");
    let input = generate_records();

    for &radius in RADII {
        group.bench_with_input(BenchmarkId::new("median", radius), &radius, |b, &r| {
            b.iter(|| {
                let mut data = input.clone();
                sliding::median(black_box(&mut data), RECORD_LENGTH, r).unwrap();
                data
            });
        });
        group.bench_with_input(
            BenchmarkId::new("weighted_average", radius),
            &radius,
            |b, &r| {
                b.iter(|| {
                    let mut data = input.clone();
                    sliding::weighted_average(black_box(&mut data), RECORD_LENGTH, r, Window::Hamming)
                        .unwrap();
                    data
                });
            },
        );
        group.bench_with_input(BenchmarkId::new("variance", radius), &radius, |b, &r| {
            b.iter(|| {
                let mut data = input.clone();
                sliding::variance(black_box(&mut data), RECORD_LENGTH, r, true).unwrap();
                data
            });
        });
    }

    group.finish();
}

fn bench_band_power(c: &mut Criterion) {
    let input = generate_records();
    let band = BandLimitedPower {
        radius: 16,
        window: Window::Hanning,
        lo_bin: 20,
        hi_bin: 28,
    };

    c.bench_function("band_limited_power", |b| {
        b.iter(|| {
            let mut data = input.clone();
            band_limited_power(black_box(&mut data), RECORD_LENGTH, &band, || false).unwrap();
            data
        });
    });
}

fn bench_splines(c: &mut Criterion) {
    let mut group = c.benchmark_group("Spline");
    let input = generate_records();

    group.bench_function("repair_clipped", |b| {
        b.iter(|| {
            let mut data = input.clone();
            repair_clipped(black_box(&mut data), RECORD_LENGTH, 0.6).unwrap();
            data
        });
    });
    group.bench_function("smooth", |b| {
        b.iter(|| {
            let mut data = input.clone();
            smooth_with_spline(black_box(&mut data), RECORD_LENGTH, 2.0, 0.05).unwrap();
            data
        });
    });
    group.bench_function("zero_crossings", |b| {
        b.iter(|| {
            zero_crossing_locations(black_box(&input), RECORD_LENGTH, Interpolation::CubicSpline)
                .unwrap()
        });
    });

    group.finish();
}

fn bench_reducers(c: &mut Criterion) {
    let input = generate_records();

    c.bench_function("reducers/kurtosis", |b| {
        b.iter(|| reducers::kurtosis(black_box(&input), RECORD_LENGTH).unwrap());
    });
    c.bench_function("reducers/median", |b| {
        b.iter(|| reducers::median(black_box(&input), RECORD_LENGTH).unwrap());
    });
}

criterion_group!(
    benches,
    bench_sliding,
    bench_band_power,
    bench_splines,
    bench_reducers,
);

criterion_main!(benches);
