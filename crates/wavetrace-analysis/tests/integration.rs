//! Integration tests for wavetrace-analysis.
//!
//! Exercises alignment, Hilbert envelopes, and spectral peaks together with
//! the core kernels, using synthetic echo records with known delays.

use proptest::prelude::*;
use wavetrace_analysis::{
    HilbertDirection, align, envelope, hilbert_transform, spectral_maximum,
};
use wavetrace_core::{Baseline, Window, reducers, subtract_baseline};

const TAU: f64 = std::f64::consts::TAU;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Gaussian-windowed tone burst centred at `centre`.
fn echo(len: usize, centre: f64, cycles_per_sample: f64) -> Vec<f64> {
    let width = len as f64 / 16.0;
    (0..len)
        .map(|n| {
            let t = n as f64 - centre;
            (-0.5 * (t / width).powi(2)).exp() * (TAU * cycles_per_sample * t).cos()
        })
        .collect()
}

fn rotated(record: &[f64], shift: usize) -> Vec<f64> {
    let mut out = record.to_vec();
    out.rotate_right(shift);
    out
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

#[test]
fn align_recovers_known_delays() {
    let seed = echo(64, 20.0, 0.1);
    let delays = [0usize, 3, 11, 60];
    let mut data: Vec<f64> = delays.iter().flat_map(|&d| rotated(&seed, d)).collect();

    let lags = align(&mut data, 64, &seed, 0..64).unwrap();
    assert_eq!(lags, vec![0, -3, -11, 4]);
    for record in data.chunks(64) {
        for (a, b) in record.iter().zip(&seed) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}

#[test]
fn align_on_a_gated_segment() {
    // Two echoes; only the second is inside the gate.
    let first = echo(96, 20.0, 0.1);
    let second = echo(96, 60.0, 0.2);
    let seed: Vec<f64> = first.iter().zip(&second).map(|(a, b)| a + b).collect();
    let record = rotated(&second, 5);

    let mut data = record.clone();
    let lags = align(&mut data, 96, &seed, 45..75).unwrap();
    assert_eq!(lags, vec![-5]);
    for (a, b) in data.iter().zip(&second) {
        assert!((a - b).abs() < 1e-12);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Rotating a record and aligning it back against the original restores it.
    #[test]
    fn align_undoes_rotation(shift in 0usize..64, centre in 10.0f64..54.0) {
        let seed = echo(64, centre, 0.15);
        let mut data = rotated(&seed, shift);
        align(&mut data, 64, &seed, 0..64).unwrap();
        for (a, b) in data.iter().zip(&seed) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope and Hilbert transform
// ---------------------------------------------------------------------------

#[test]
fn envelope_tracks_burst_amplitude() {
    let mut data = echo(128, 64.0, 0.125);
    let original = data.clone();
    envelope(&mut data, 128, false).unwrap();

    // The envelope bounds the carrier and peaks at the burst centre.
    for (e, x) in data.iter().zip(&original) {
        assert!(*e >= x.abs() - 1e-12);
    }
    let peak = reducers::max_index(&data, 128).unwrap()[0];
    assert!((62..=66).contains(&peak), "peak at {peak}");
    assert!((data[64] - 1.0).abs() < 0.01);
}

#[test]
fn hilbert_turns_cosine_into_sine() {
    let len = 32;
    let mut data: Vec<f64> = (0..len)
        .map(|n| (TAU * 3.0 * f64::from(n) / 32.0).cos())
        .collect();
    hilbert_transform(&mut data, len as usize, HilbertDirection::Forward).unwrap();
    for (n, h) in data.iter().enumerate() {
        let expected = (TAU * 3.0 * n as f64 / 32.0).sin();
        assert!((h - expected).abs() < 1e-12);
    }
}

#[test]
fn envelope_after_baseline_removal_matches_subtract_mean() {
    let mut record: Vec<f64> = echo(40, 18.0, 0.2).iter().map(|x| x + 0.75).collect();
    let mut centred = record.clone();
    subtract_baseline(&mut centred, 40, Baseline::Mean).unwrap();
    envelope(&mut centred, 40, false).unwrap();
    envelope(&mut record, 40, true).unwrap();
    for (a, b) in record.iter().zip(&centred) {
        assert!((a - b).abs() < 1e-12);
    }
}

// ---------------------------------------------------------------------------
// Spectral maximum
// ---------------------------------------------------------------------------

#[test]
fn spectral_maximum_finds_carriers() {
    let mut data = echo(256, 128.0, 0.125);
    data.extend(echo(256, 100.0, 0.25));
    // 1 µs sampling: 0.125 cycles/sample = 125 kHz.
    let peaks = spectral_maximum(&data, 256, 1e-6, Window::Hanning).unwrap();
    assert!((peaks[0] - 125_000.0).abs() < 1e-6, "{peaks:?}");
    assert!((peaks[1] - 250_000.0).abs() < 1e-6, "{peaks:?}");
}
