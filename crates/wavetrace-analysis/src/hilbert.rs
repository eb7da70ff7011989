//! Hilbert transform and analytic-signal envelope.
//!
//! # Algorithm
//!
//! Each record is zero-padded to the next power of two `N` and transformed.
//! The Hilbert transform multiplies the spectrum by `-i·sign(k)`:
//! 1. DC (bin 0) and Nyquist (bin N/2) are zeroed
//! 2. Positive frequencies (bins 1 to N/2-1) are multiplied by `-i`
//! 3. Negative frequencies (bins N/2+1 to N-1) are multiplied by `+i`
//!
//! and the inverse FFT, truncated back to the record length, gives `H{x}`.
//! The inverse transform uses the conjugate multiplier, so for a record with
//! no DC or Nyquist content the two undo each other.
//!
//! The envelope is the magnitude of the analytic signal, `sqrt(x² + H{x}²)`.
//!
//! # Example
//!
//! ```rust
//! use wavetrace_analysis::hilbert::HilbertTransform;
//! use std::f64::consts::PI;
//!
//! let hilbert = HilbertTransform::new(64);
//! let signal: Vec<f64> = (0..64)
//!     .map(|i| (2.0 * PI * 4.0 * i as f64 / 64.0).cos())
//!     .collect();
//!
//! // cos -> sin, and the envelope of a pure tone is flat
//! let envelope = hilbert.envelope(&signal);
//! assert!(envelope.iter().all(|&a| (a - 1.0).abs() < 1e-9));
//! ```

use rustfft::num_complex::Complex;
use wavetrace_core::{RecordLayout, Result, Sample, transform_records};

use crate::fft::{Fft, padded_length};

/// Sign of the frequency-domain multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HilbertDirection {
    /// `-i·sign(k)`
    #[default]
    Forward,
    /// `+i·sign(k)`
    Inverse,
}

/// Hilbert transform processor for records of one length.
///
/// Holds the padded FFT plan so repeated single-record calls skip planning.
pub struct HilbertTransform {
    fft: Fft,
    record_length: usize,
}

impl HilbertTransform {
    /// Create a processor for records of `record_length` samples.
    pub fn new(record_length: usize) -> Self {
        Self {
            fft: Fft::new(padded_length(record_length)),
            record_length,
        }
    }

    /// Record length this processor was built for.
    pub fn record_length(&self) -> usize {
        self.record_length
    }

    /// Padded FFT length.
    pub fn fft_size(&self) -> usize {
        self.fft.size()
    }

    /// Hilbert transform of `record`, written into `output`.
    ///
    /// Both slices must be `record_length` long.
    pub fn transform_into(&self, record: &[f64], output: &mut [f64], direction: HilbertDirection) {
        let mut buffer = self.fft.forward_real(record);
        let size = buffer.len();
        let half = size / 2;
        let rotation = match direction {
            HilbertDirection::Forward => Complex::new(0.0, -1.0),
            HilbertDirection::Inverse => Complex::new(0.0, 1.0),
        };

        buffer[0] = Complex::new(0.0, 0.0);
        if size > 1 {
            buffer[half] = Complex::new(0.0, 0.0);
        }
        for c in buffer.iter_mut().take(half).skip(1) {
            *c *= rotation;
        }
        for c in buffer.iter_mut().skip(half + 1) {
            *c *= -rotation;
        }

        self.fft.inverse_complex(&mut buffer);
        for (out, c) in output.iter_mut().zip(buffer) {
            *out = c.re;
        }
    }

    /// Hilbert transform of `record`.
    pub fn transform(&self, record: &[f64], direction: HilbertDirection) -> Vec<f64> {
        let mut output = vec![0.0; record.len().min(self.record_length)];
        self.transform_into(record, &mut output, direction);
        output
    }

    /// Analytic signal `x + i·H{x}`.
    pub fn analytic_signal(&self, record: &[f64]) -> Vec<Complex<f64>> {
        self.transform(record, HilbertDirection::Forward)
            .into_iter()
            .zip(record)
            .map(|(h, &x)| Complex::new(x, h))
            .collect()
    }

    /// Instantaneous amplitude `|x + i·H{x}|`.
    pub fn envelope(&self, record: &[f64]) -> Vec<f64> {
        self.analytic_signal(record)
            .iter()
            .map(|c| c.norm())
            .collect()
    }

    /// Instantaneous phase in radians, in `(-π, π]`.
    pub fn instantaneous_phase(&self, record: &[f64]) -> Vec<f64> {
        self.analytic_signal(record)
            .iter()
            .map(|c| c.arg())
            .collect()
    }
}

/// Replaces every record with its Hilbert transform.
///
/// # Example
/// ```rust
/// use wavetrace_analysis::{HilbertDirection, hilbert_transform};
///
/// let mut data: [f64; 8] = [1.0, 2.0, 3.0, 2.0, -3.0, -1.0, 0.0, 1.0];
/// hilbert_transform(&mut data, 8, HilbertDirection::Forward).unwrap();
/// assert!((data[3] - 3.724873734152916).abs() < 1e-12);
/// ```
pub fn hilbert_transform<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    direction: HilbertDirection,
) -> Result<()> {
    let layout = RecordLayout::of(buffer, record_length)?;
    let hilbert = HilbertTransform::new(record_length);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "hilbert_transform: {} records of {record_length}, padded to {}",
        layout.num_records(),
        hilbert.fft_size()
    );

    transform_records(buffer, layout, |input, output| {
        hilbert.transform_into(input, output, direction);
    });
    Ok(())
}

/// Replaces every record with its analytic-signal envelope.
///
/// With `subtract_mean`, each record's mean is removed first, both from the
/// transformed signal and from the `x` term of the magnitude. Log
/// compression is left to the caller.
pub fn envelope<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    subtract_mean: bool,
) -> Result<()> {
    let layout = RecordLayout::of(buffer, record_length)?;
    let hilbert = HilbertTransform::new(record_length);
    let mut centred = vec![0.0; record_length];

    transform_records(buffer, layout, |input, output| {
        let offset = if subtract_mean {
            input.iter().sum::<f64>() / record_length as f64
        } else {
            0.0
        };
        for (c, &x) in centred.iter_mut().zip(input) {
            *c = x - offset;
        }
        hilbert.transform_into(&centred, output, HilbertDirection::Forward);
        for (out, &x) in output.iter_mut().zip(&centred) {
            *out = x.hypot(*out);
        }
    });
    Ok(())
}
