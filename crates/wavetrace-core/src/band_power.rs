//! Moving-window band-limited power by direct DFT.
//!
//! Each output sample is the power of a few DFT bins evaluated over the
//! windowed, mirrored neighbourhood of that sample, converted to decibels bin
//! by bin and then averaged:
//!
//! ```text
//! X_k(i) = Σ_j w_j · x[i - r + j] · e^(-2πi·k·j/L)      j = 0..2r
//! P(i)   = Σ_{k=lo..hi-1} 10·log10|X_k(i)|² / (hi - lo)
//! ```
//!
//! A single empty bin therefore pulls the whole band to `-inf`.
//!
//! Bin `k` sits at `k / L` cycles per sample. Only a handful of bins are
//! wanted, so a cosine/sine table indexed by `[bin][tap]` beats a full FFT
//! per window position.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::PI;

use libm::{ceil, cos, floor, log10, sin};

use crate::error::{Result, WaveformError};
use crate::records::{RecordLayout, mirror_index};
use crate::sample::Sample;
use crate::window::Window;

/// Bin range, radius and taper for [`band_limited_power`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandLimitedPower {
    /// Window radius in samples; the window spans `2 * radius + 1` taps.
    pub radius: usize,
    /// Taper applied to the taps, normalized to unit sum.
    pub window: Window,
    /// First bin of the band.
    pub lo_bin: usize,
    /// One past the last bin of the band.
    pub hi_bin: usize,
}

impl BandLimitedPower {
    /// Converts a band given in physical units.
    ///
    /// `delta_t` is the sample period, `lo_freq..=hi_freq` the band in the
    /// reciprocal unit, and `window_time` the full window length in the unit
    /// of `delta_t`. Bins whose frequency `k / (L·Δt)` falls inside the band
    /// are selected.
    ///
    /// # Example
    /// ```rust
    /// use wavetrace_core::{BandLimitedPower, Window};
    ///
    /// let band = BandLimitedPower::from_physical(0.5, 0.1, 0.25, 4.0, 32, Window::Hamming).unwrap();
    /// assert_eq!((band.lo_bin, band.hi_bin, band.radius), (2, 5, 4));
    /// ```
    pub fn from_physical(
        delta_t: f64,
        lo_freq: f64,
        hi_freq: f64,
        window_time: f64,
        record_length: usize,
        window: Window,
    ) -> Result<Self> {
        if !(delta_t.is_finite() && delta_t > 0.0) {
            return Err(WaveformError::invalid_parameter(
                "delta_t",
                "must be finite and positive",
            ));
        }
        if !(lo_freq.is_finite() && lo_freq >= 0.0) {
            return Err(WaveformError::invalid_parameter(
                "lo_freq",
                "must be finite and non-negative",
            ));
        }
        if !(hi_freq > lo_freq && hi_freq <= 0.5 / delta_t) {
            return Err(WaveformError::invalid_parameter(
                "hi_freq",
                "must lie above lo_freq and at or below the Nyquist frequency",
            ));
        }
        if !(window_time.is_finite() && window_time > 0.0) {
            return Err(WaveformError::invalid_parameter(
                "window_time",
                "must be finite and positive",
            ));
        }

        let bins_per_unit = record_length as f64 * delta_t;
        let band = Self {
            radius: floor(window_time / delta_t / 2.0) as usize,
            window,
            lo_bin: ceil(lo_freq * bins_per_unit) as usize,
            hi_bin: floor(hi_freq * bins_per_unit) as usize + 1,
        };
        band.validate(record_length)?;
        Ok(band)
    }

    /// Number of bins in the band.
    pub fn num_bins(&self) -> usize {
        self.hi_bin.saturating_sub(self.lo_bin)
    }

    /// Checks the band against a record length.
    pub fn validate(&self, record_length: usize) -> Result<()> {
        self.window.validate()?;
        if self.lo_bin >= self.hi_bin {
            return Err(WaveformError::invalid_parameter(
                "band",
                "selects no DFT bins",
            ));
        }
        if self.hi_bin > record_length / 2 + 1 {
            return Err(WaveformError::invalid_parameter(
                "band",
                "extends past the Nyquist bin",
            ));
        }
        Ok(())
    }
}

/// `[bin][tap]` twiddle table.
struct TrigTable {
    taps: usize,
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl TrigTable {
    fn new(band: &BandLimitedPower, taps: usize, record_length: usize) -> Self {
        let size = band.num_bins() * taps;
        let mut table = Self {
            taps,
            cos: Vec::with_capacity(size),
            sin: Vec::with_capacity(size),
        };
        for k in band.lo_bin..band.hi_bin {
            let step = -2.0 * PI * k as f64 / record_length as f64;
            for j in 0..taps {
                table.cos.push(cos(step * j as f64));
                table.sin.push(sin(step * j as f64));
            }
        }
        table
    }

    /// Mean of `10·log10|X_k|²` over the band for one block of weighted taps.
    fn mean_power_db(&self, weighted: &[f64]) -> f64 {
        let bins = self.cos.len() / self.taps;
        let total: f64 = self
            .cos
            .chunks_exact(self.taps)
            .zip(self.sin.chunks_exact(self.taps))
            .map(|(c, s)| {
                let (mut re, mut im) = (0.0, 0.0);
                for ((&x, &c), &s) in weighted.iter().zip(c).zip(s) {
                    re += x * c;
                    im += x * s;
                }
                10.0 * log10(re * re + im * im)
            })
            .sum();
        total / bins as f64
    }
}

/// Replaces every sample with the band-limited power around it, in dB.
///
/// `abort` is polled before each record; once it returns `true` the call
/// stops with [`WaveformError::Aborted`], leaving the records already
/// processed written and the rest untouched. A window with no energy in any
/// bin of the band yields `-inf`.
pub fn band_limited_power<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    band: &BandLimitedPower,
    mut abort: impl FnMut() -> bool,
) -> Result<()> {
    let layout = RecordLayout::of(buffer, record_length)?.require_radius(band.radius)?;
    band.validate(record_length)?;

    let weights = band.window.weights(2 * band.radius + 1, true)?;
    let table = TrigTable::new(band, weights.len(), record_length);
    let mut input = Vec::with_capacity(record_length);
    let mut weighted = Vec::with_capacity(weights.len());

    for index in 0..layout.num_records() {
        if abort() {
            #[cfg(feature = "tracing")]
            tracing::debug!("band_limited_power: aborted after {index} records");
            return Err(WaveformError::Aborted { completed: index });
        }
        let record = &mut buffer[layout.record_range(index)];
        input.clear();
        input.extend(record.iter().map(|x| x.to_f64()));

        for (i, out) in record.iter_mut().enumerate() {
            let start = i as isize - band.radius as isize;
            weighted.clear();
            weighted.extend(
                weights
                    .iter()
                    .enumerate()
                    .map(|(j, &w)| w * input[mirror_index(start + j as isize, record_length)]),
            );
            *out = T::from_f64(table.mean_power_db(&weighted));
        }
    }
    Ok(())
}
