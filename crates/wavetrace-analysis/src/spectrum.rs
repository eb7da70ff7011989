//! Per-record power spectra and spectral peaks

use wavetrace_core::{RecordLayout, Result, Sample, WaveformError, Window, reduce_records};

use crate::fft::{Fft, padded_length};

/// One-sided power spectrum `|X_k|²`, `k = 0..=N/2`, of a windowed record.
///
/// `window` must hold one weight per sample; the product is zero-padded to
/// the plan size.
pub fn power_spectrum(fft: &Fft, record: &[f64], window: &[f64]) -> Vec<f64> {
    let windowed: Vec<f64> = record.iter().zip(window).map(|(x, w)| x * w).collect();
    let mut spectrum = fft.forward_real(&windowed);
    spectrum.truncate(fft.size() / 2 + 1);
    spectrum.iter().map(|c| c.norm_sqr()).collect()
}

/// Frequency of the strongest spectral component of each record.
///
/// Records are tapered with `window`, zero-padded to the next power of two
/// `N`, and transformed; the result is `k / (N·delta_t)` for the bin `k` in
/// `0..=N/2` with the largest power. Ties resolve to the lowest frequency.
///
/// # Example
/// ```rust
/// use wavetrace_analysis::spectral_maximum;
/// use wavetrace_core::Window;
///
/// let data = [1.0, 3.0, 2.0, -1.0, -3.0, 0.0, -3.0, 1.0];
/// let peaks = spectral_maximum(&data, 8, 0.01, Window::Rectangle).unwrap();
/// assert!((peaks[0] - 12.5).abs() < 1e-9);
/// ```
pub fn spectral_maximum<T: Sample>(
    buffer: &[T],
    record_length: usize,
    delta_t: f64,
    window: Window,
) -> Result<Vec<f64>> {
    let layout = RecordLayout::of(buffer, record_length)?;
    if !(delta_t.is_finite() && delta_t > 0.0) {
        return Err(WaveformError::invalid_parameter(
            "delta_t",
            "must be finite and positive",
        ));
    }
    let weights = window.weights(record_length, false)?;
    let padded = padded_length(record_length);
    let fft = Fft::new(padded);
    let delta_f = 1.0 / (padded as f64 * delta_t);

    Ok(reduce_records(buffer, layout, |record| {
        let power = power_spectrum(&fft, record, &weights);
        let mut best = 0;
        for (k, &p) in power.iter().enumerate().skip(1) {
            if p > power[best] {
                best = k;
            }
        }
        best as f64 * delta_f
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: [f64; 8] = [1.0, 3.0, 2.0, -1.0, -3.0, 0.0, -3.0, 1.0];

    #[test]
    fn peak_frequency_per_record() {
        let peaks = spectral_maximum(&RECORD, 8, 0.01, Window::Rectangle).unwrap();
        assert_eq!(peaks.len(), 1);
        assert!((peaks[0] - 12.5).abs() < 1e-9);

        let padded = [1.0, 3.0, 2.0, -1.0, -3.0, 0.0, -3.0, 1.0, 3.0, 2.0, -1.0, -3.0, 0.0, -3.0];
        let peaks = spectral_maximum(&padded, 7, 0.01, Window::Rectangle).unwrap();
        assert_eq!(peaks.len(), 2);
        assert!(peaks.iter().all(|p| (p - 12.5).abs() < 1e-9));
    }

    #[test]
    fn constant_record_peaks_at_dc() {
        let peaks = spectral_maximum(&[2.0f32; 16], 16, 1e-3, Window::Hanning).unwrap();
        assert_eq!(peaks, vec![0.0]);
    }

    #[test]
    fn tone_lands_on_its_bin() {
        let record: Vec<f64> = (0..64)
            .map(|n| (std::f64::consts::TAU * 5.0 * f64::from(n) / 64.0).sin())
            .collect();
        // 64 samples at 1 kHz: bin spacing 15.625 Hz.
        let peaks = spectral_maximum(&record, 64, 1e-3, Window::Hamming).unwrap();
        assert!((peaks[0] - 5.0 * 15.625).abs() < 1e-9);
    }

    #[test]
    fn power_spectrum_is_one_sided() {
        let fft = Fft::new(8);
        let power = power_spectrum(&fft, &RECORD, &[1.0; 8]);
        assert_eq!(power.len(), 5);
        assert!(power[0].abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_sample_period() {
        assert!(spectral_maximum(&RECORD, 8, 0.0, Window::Rectangle).is_err());
        assert!(spectral_maximum(&RECORD, 8, f64::NAN, Window::Rectangle).is_err());
        assert!(spectral_maximum(&RECORD, 3, 0.01, Window::Rectangle).is_err());
    }
}
