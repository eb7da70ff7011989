//! FFT wrapper over paired real/imaginary records
//!
//! Forward transforms are unnormalized; inverse transforms divide by `N`, so a
//! forward/inverse pair reproduces its input.

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;
use wavetrace_core::{RecordLayout, Result, Sample, WaveformError};

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FftDirection {
    /// Time to frequency, unnormalized.
    #[default]
    Forward,
    /// Frequency to time, divided by `N`.
    Inverse,
}

/// Padding that brings `len` up to the next power of two.
///
/// An empty record pads to length 1.
///
/// ```rust
/// use wavetrace_analysis::fft::amount_to_pad;
///
/// assert_eq!(amount_to_pad(0), 1);
/// assert_eq!(amount_to_pad(1), 0);
/// assert_eq!(amount_to_pad(6), 2);
/// assert_eq!(amount_to_pad(64), 0);
/// ```
pub fn amount_to_pad(len: usize) -> usize {
    len.next_power_of_two() - len
}

/// `len` rounded up to a power of two.
pub fn padded_length(len: usize) -> usize {
    len + amount_to_pad(len)
}

fn require_power_of_two(len: usize) -> Result<()> {
    if len.is_power_of_two() {
        Ok(())
    } else {
        Err(WaveformError::NotPowerOfTwo(len))
    }
}

fn require_pair(re: &[f64], im: &[f64]) -> Result<()> {
    if re.len() != im.len() {
        return Err(WaveformError::LengthMismatch {
            what: "imaginary part",
            expected: re.len(),
            actual: im.len(),
        });
    }
    require_power_of_two(re.len())
}

/// FFT processor with cached plans
pub struct Fft {
    planner: FftPlanner<f64>,
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self {
            planner,
            fft,
            ifft,
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Resize the FFT (creates new plan if needed)
    pub fn resize(&mut self, size: usize) {
        if size != self.size {
            self.fft = self.planner.plan_fft_forward(size);
            self.ifft = self.planner.plan_fft_inverse(size);
            self.size = size;
        }
    }

    /// Forward FFT on a complex buffer of exactly `size` points (in-place)
    pub fn forward_complex(&self, buffer: &mut [Complex<f64>]) {
        self.fft.process(buffer);
    }

    /// Inverse FFT on a complex buffer (in-place), divided by `size`
    pub fn inverse_complex(&self, buffer: &mut [Complex<f64>]) {
        self.ifft.process(buffer);

        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }

    /// Transforms `len <= size` real samples, zero-padded to `size`.
    pub fn forward_real(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));
        self.forward_complex(&mut buffer);
        buffer
    }

    /// Transforms split real/imaginary arrays in place.
    pub fn process_split(
        &self,
        re: &mut [f64],
        im: &mut [f64],
        direction: FftDirection,
    ) -> Result<()> {
        if re.len() != self.size {
            return Err(WaveformError::LengthMismatch {
                what: "FFT input",
                expected: self.size,
                actual: re.len(),
            });
        }
        require_pair(re, im)?;

        let mut buffer: Vec<Complex<f64>> = re
            .iter()
            .zip(im.iter())
            .map(|(&r, &i)| Complex::new(r, i))
            .collect();
        match direction {
            FftDirection::Forward => self.forward_complex(&mut buffer),
            FftDirection::Inverse => self.inverse_complex(&mut buffer),
        }
        for ((r, i), c) in re.iter_mut().zip(im.iter_mut()).zip(buffer) {
            *r = c.re;
            *i = c.im;
        }
        Ok(())
    }
}

/// Forward FFT of paired power-of-two arrays, in place.
pub fn fft_forward(re: &mut [f64], im: &mut [f64]) -> Result<()> {
    require_pair(re, im)?;
    Fft::new(re.len()).process_split(re, im, FftDirection::Forward)
}

/// Inverse FFT of paired power-of-two arrays, in place, divided by `N`.
pub fn fft_inverse(re: &mut [f64], im: &mut [f64]) -> Result<()> {
    require_pair(re, im)?;
    Fft::new(re.len()).process_split(re, im, FftDirection::Inverse)
}

/// Complex FFT of every record of a split buffer, in place.
///
/// `real` and `imag` hold the same record layout; the record length must be
/// a power of two.
///
/// # Example
/// ```rust
/// use wavetrace_analysis::fft::{FftDirection, fft_records};
///
/// let mut re: [f64; 8] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
/// let mut im: [f64; 8] = [7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0];
/// fft_records(&mut re, &mut im, 4, FftDirection::Forward).unwrap();
/// assert!((re[0] - 10.0).abs() < 1e-12);
/// assert!((im[4] - 6.0).abs() < 1e-12);
/// ```
pub fn fft_records<T: Sample>(
    real: &mut [T],
    imag: &mut [T],
    record_length: usize,
    direction: FftDirection,
) -> Result<()> {
    let layout = RecordLayout::of(real, record_length)?;
    if imag.len() != real.len() {
        return Err(WaveformError::LengthMismatch {
            what: "imaginary buffer",
            expected: real.len(),
            actual: imag.len(),
        });
    }
    require_power_of_two(record_length)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "fft_records: {} records of {record_length}, {direction:?}",
        layout.num_records()
    );

    let fft = Fft::new(record_length);
    let mut buffer = vec![Complex::new(0.0, 0.0); record_length];
    for index in 0..layout.num_records() {
        let range = layout.record_range(index);
        let (re, im) = (&mut real[range.clone()], &mut imag[range]);
        for ((c, r), i) in buffer.iter_mut().zip(re.iter()).zip(im.iter()) {
            *c = Complex::new(r.to_f64(), i.to_f64());
        }
        match direction {
            FftDirection::Forward => fft.forward_complex(&mut buffer),
            FftDirection::Inverse => fft.inverse_complex(&mut buffer),
        }
        for ((c, r), i) in buffer.iter().zip(re.iter_mut()).zip(im.iter_mut()) {
            *r = T::from_f64(c.re);
            *i = T::from_f64(c.im);
        }
    }
    Ok(())
}
