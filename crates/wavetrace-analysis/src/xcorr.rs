//! Circular cross-correlation on padded records and peak-lag detection.
//!
//! # Mathematical Definition
//!
//! For two records zero-padded to the same power-of-two length `N`:
//!
//! ```text
//! R_xy[k] = Σ_n x[n] · y[(n + k) mod N]  =  IFFT( conj(X) · Y )[k]
//! ```
//!
//! A peak at `k` means `x[n] ≈ y[n + k]`, so rotating `x` right by `k`
//! lines it up with `y`. Indices `k >= N/2` stand for negative lags
//! `k - N`.

use crate::fft::Fft;
use rustfft::num_complex::Complex;

/// Direct `O(N²)` circular cross-correlation.
///
/// Both inputs are zero-extended to `len`. Mainly a reference for
/// [`xcorr_fft`].
pub fn xcorr_direct(x: &[f64], y: &[f64], len: usize) -> Vec<f64> {
    let at = |s: &[f64], i: usize| s.get(i).copied().unwrap_or(0.0);
    (0..len)
        .map(|k| (0..len).map(|n| at(x, n) * at(y, (n + k) % len)).sum())
        .collect()
}

/// FFT-based circular cross-correlation.
///
/// The plan size sets the padded length; inputs longer than it are
/// truncated.
///
/// # Returns
///
/// `Vec<f64>` of length `fft.size()`, indexed by circular lag.
pub fn xcorr_fft(fft: &Fft, x: &[f64], y: &[f64]) -> Vec<f64> {
    let spectrum_x = fft.forward_real(&x[..x.len().min(fft.size())]);
    let spectrum_y = fft.forward_real(&y[..y.len().min(fft.size())]);
    xcorr_spectra(fft, &spectrum_x, &spectrum_y)
}

/// Cross-correlation from two precomputed spectra of size `fft.size()`.
pub fn xcorr_spectra(fft: &Fft, x: &[Complex<f64>], y: &[Complex<f64>]) -> Vec<f64> {
    let mut product: Vec<Complex<f64>> = x.iter().zip(y).map(|(a, b)| a.conj() * b).collect();
    fft.inverse_complex(&mut product);
    product.into_iter().map(|c| c.re).collect()
}

/// Signed lag of the largest correlation value.
///
/// Ties go to the first index. Indices at or past half the length fold to
/// negative lags. An empty slice gives lag 0.
///
/// ```rust
/// use wavetrace_analysis::xcorr::peak_lag;
///
/// assert_eq!(peak_lag(&[0.1, 0.9, 0.2, 0.0]), 1);
/// assert_eq!(peak_lag(&[0.1, 0.0, 0.2, 0.9]), -1);
/// ```
pub fn peak_lag(correlation: &[f64]) -> isize {
    let mut best = 0;
    for (i, &value) in correlation.iter().enumerate().skip(1) {
        if value > correlation[best] {
            best = i;
        }
    }
    let len = correlation.len();
    if best >= len / 2 && len > 0 {
        best as isize - len as isize
    } else {
        best as isize
    }
}
