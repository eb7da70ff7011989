//! Record layout validation and per-record iteration.
//!
//! A record buffer is a flat slice holding `num_records` waveforms of
//! `record_length` samples each, back to back: sample `j` of record `i`
//! lives at `buffer[i * record_length + j]`.
//!
//! Every kernel validates its input through [`RecordLayout`] before touching
//! any samples, then walks the records with [`transform_records`] (in-place
//! kernels) or [`reduce_records`] (one value per record).

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::ops::Range;

use crate::error::{Result, WaveformError};
use crate::sample::Sample;

/// Validated shape of a record buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    record_length: usize,
    num_records: usize,
}

impl RecordLayout {
    /// Validates a buffer length against a record length.
    ///
    /// Fails when the record length is zero, the buffer is empty, or the
    /// buffer does not hold a whole number of records.
    ///
    /// # Example
    /// ```rust
    /// use wavetrace_core::RecordLayout;
    ///
    /// let layout = RecordLayout::new(12, 4).unwrap();
    /// assert_eq!(layout.num_records(), 3);
    /// assert!(RecordLayout::new(12, 5).is_err());
    /// ```
    pub fn new(buffer_len: usize, record_length: usize) -> Result<Self> {
        if record_length == 0 {
            return Err(WaveformError::ZeroRecordLength);
        }
        if buffer_len == 0 {
            return Err(WaveformError::EmptyBuffer);
        }
        if buffer_len % record_length != 0 {
            return Err(WaveformError::RaggedBuffer {
                len: buffer_len,
                record_length,
            });
        }
        Ok(Self {
            record_length,
            num_records: buffer_len / record_length,
        })
    }

    /// Validates `buffer` against `record_length`.
    pub fn of<T>(buffer: &[T], record_length: usize) -> Result<Self> {
        Self::new(buffer.len(), record_length)
    }

    /// Samples per record.
    #[inline]
    pub fn record_length(&self) -> usize {
        self.record_length
    }

    /// Number of records in the buffer.
    #[inline]
    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// Total number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.record_length * self.num_records
    }

    /// Always false; a layout cannot be built for an empty buffer.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Sample range of record `index` within the buffer.
    #[inline]
    pub fn record_range(&self, index: usize) -> Range<usize> {
        let start = index * self.record_length;
        start..start + self.record_length
    }

    /// Rejects records shorter than `min` samples.
    pub fn require_min_length(self, operation: &'static str, min: usize) -> Result<Self> {
        if self.record_length < min {
            return Err(WaveformError::RecordTooShort {
                operation,
                record_length: self.record_length,
                min,
            });
        }
        Ok(self)
    }

    /// Rejects a window radius whose `2 * radius + 1` taps exceed a record.
    ///
    /// Within that bound every mirrored index stays inside the record.
    pub fn require_radius(self, radius: usize) -> Result<Self> {
        let fits = radius
            .checked_mul(2)
            .and_then(|n| n.checked_add(1))
            .is_some_and(|window| window <= self.record_length);
        if !fits {
            return Err(WaveformError::RadiusTooLarge {
                radius,
                record_length: self.record_length,
            });
        }
        Ok(self)
    }
}

/// Reflects an out-of-range index about the nearest record endpoint.
///
/// `index < 0` maps to `-index`; `index >= len` maps to `2 * (len - 1) - index`.
/// Valid for any index within `len - 1` of the record bounds.
///
/// # Example
/// ```rust
/// use wavetrace_core::mirror_index;
///
/// assert_eq!(mirror_index(-2, 8), 2);
/// assert_eq!(mirror_index(3, 8), 3);
/// assert_eq!(mirror_index(9, 8), 5);
/// ```
#[inline]
pub fn mirror_index(index: isize, len: usize) -> usize {
    if index < 0 {
        index.unsigned_abs()
    } else {
        let index = index as usize;
        if index >= len {
            2 * (len - 1) - index
        } else {
            index
        }
    }
}

/// Runs `kernel` over every record of `buffer`, in place.
///
/// The kernel sees the record widened to `f64` and writes its result into an
/// output slice of the same length, which is narrowed back into the buffer.
/// Scratch buffers are reused across records.
pub fn transform_records<T, F>(buffer: &mut [T], layout: RecordLayout, mut kernel: F)
where
    T: Sample,
    F: FnMut(&[f64], &mut [f64]),
{
    let len = layout.record_length();
    let mut input = vec![0.0; len];
    let mut output = vec![0.0; len];
    for record in buffer.chunks_exact_mut(len) {
        for (dst, &src) in input.iter_mut().zip(record.iter()) {
            *dst = src.to_f64();
        }
        kernel(&input, &mut output);
        for (dst, &src) in record.iter_mut().zip(output.iter()) {
            *dst = T::from_f64(src);
        }
    }
}

/// Reduces every record of `buffer` to one value.
pub fn reduce_records<T, R, F>(buffer: &[T], layout: RecordLayout, mut reducer: F) -> Vec<R>
where
    T: Sample,
    F: FnMut(&[f64]) -> R,
{
    let len = layout.record_length();
    let mut scratch = vec![0.0; len];
    buffer
        .chunks_exact(len)
        .map(|record| {
            for (dst, &src) in scratch.iter_mut().zip(record.iter()) {
                *dst = src.to_f64();
            }
            reducer(&scratch)
        })
        .collect()
}
