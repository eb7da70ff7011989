//! Per-record statistics.
//!
//! Each reducer makes one pass over every record and returns one value per
//! record. Invalid shapes (zero record length, empty or ragged buffers) are
//! reported as errors instead of panicking.
//!
//! | Reducer | Result | Minimum record length |
//! |---------|--------|-----------------------|
//! | [`mean`] | `Σx / n` | 1 |
//! | [`median`] | middle value, or mean of the middle pair | 1 |
//! | [`min`] / [`max`] / [`range`] | extremes | 1 |
//! | [`max_index`] | first index of the maximum | 1 |
//! | [`sum_of_squares`] | `Σx²` | 1 |
//! | [`zero_crossing_count`] | adjacent sign changes | 1 |
//! | [`kurtosis`] | excess kurtosis | 2 |
//! | [`skewness`] | sample or adjusted skewness | 3 |
//!
//! [`average_records`] is the odd one out: it averages records element-wise
//! and returns a single record.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use libm::sqrt;

use crate::error::Result;
use crate::records::{RecordLayout, reduce_records};
use crate::sample::Sample;

/// Single-pass accumulator for central moments up to the fourth order.
///
/// Uses Terriberry's update, which stays accurate for large offsets where
/// the textbook `Σx² - (Σx)²/n` form cancels catastrophically.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMoments {
    n: f64,
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl RunningMoments {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates one observation.
    pub fn push(&mut self, x: f64) {
        let n1 = self.n;
        self.n += 1.0;
        let n = self.n;
        let delta = x - self.mean;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;
        self.mean += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;
    }

    /// Number of observations.
    pub fn count(&self) -> f64 {
        self.n
    }

    /// Running mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Excess kurtosis `n·m4 / m2² - 3`.
    pub fn kurtosis(&self) -> f64 {
        self.n * self.m4 / (self.m2 * self.m2) - 3.0
    }

    /// Sample skewness `g1 = √n·m3 / m2^1.5`, or the bias-adjusted
    /// `G1 = g1·√(n(n-1)) / (n-2)` when `sample` is false.
    pub fn skewness(&self, sample: bool) -> f64 {
        let n = self.n;
        let g1 = sqrt(n) * self.m3 / (self.m2 * sqrt(self.m2));
        if sample {
            g1
        } else {
            g1 * sqrt(n * (n - 1.0)) / (n - 2.0)
        }
    }
}

impl FromIterator<f64> for RunningMoments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut moments = RunningMoments::new();
        for x in iter {
            moments.push(x);
        }
        moments
    }
}

fn reduce<T: Sample>(
    buffer: &[T],
    record_length: usize,
    reducer: impl FnMut(&[f64]) -> f64,
) -> Result<Vec<T>> {
    let layout = RecordLayout::of(buffer, record_length)?;
    Ok(reduce_records(buffer, layout, reducer)
        .into_iter()
        .map(T::from_f64)
        .collect())
}

/// Mean of each record.
///
/// # Example
/// ```rust
/// use wavetrace_core::reducers::mean;
///
/// assert_eq!(mean(&[3.0, 4.0, 5.0, 6.0, 1.0, 8.0], 3).unwrap(), vec![4.0, 5.0]);
/// assert!(mean::<f64>(&[], 3).is_err());
/// ```
pub fn mean<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<T>> {
    reduce(buffer, record_length, mean_of)
}

/// Median of each record; even lengths average the middle pair.
pub fn median<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<T>> {
    let mut sorted = Vec::with_capacity(record_length);
    reduce(buffer, record_length, |record| {
        sorted.clear();
        sorted.extend_from_slice(record);
        median_of_unsorted(&mut sorted)
    })
}

/// Smallest value of each record.
pub fn min<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<T>> {
    reduce(buffer, record_length, |record| {
        record.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

/// Largest value of each record.
pub fn max<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<T>> {
    reduce(buffer, record_length, |record| {
        record.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// `max - min` of each record.
pub fn range<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<T>> {
    reduce(buffer, record_length, range_of)
}

/// Index of the first occurrence of each record's maximum.
pub fn max_index<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<usize>> {
    let layout = RecordLayout::of(buffer, record_length)?;
    Ok(reduce_records(buffer, layout, |record| {
        let mut best = 0;
        for (i, &x) in record.iter().enumerate().skip(1) {
            if x > record[best] {
                best = i;
            }
        }
        best
    }))
}

/// `Σx²` of each record.
pub fn sum_of_squares<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<T>> {
    reduce(buffer, record_length, |record| {
        record.iter().map(|x| x * x).sum()
    })
}

/// Number of sign changes between adjacent samples of each record.
///
/// Zero counts as non-negative, so `[-1, 0]` crosses and `[0, 1]` does not.
pub fn zero_crossing_count<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<usize>> {
    let layout = RecordLayout::of(buffer, record_length)?;
    Ok(reduce_records(buffer, layout, |record| {
        record
            .windows(2)
            .filter(|pair| crosses(pair[0], pair[1]))
            .count()
    }))
}

/// Excess kurtosis of each record.
///
/// # Example
/// ```rust
/// use wavetrace_core::reducers::kurtosis;
///
/// let k = kurtosis(&[1.0f64, 2.0, 5.0, 3.0, 2.0, 3.0, 1.0], 7).unwrap();
/// assert!((k[0] + 0.33045806067816774).abs() < 1e-12);
/// ```
pub fn kurtosis<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<T>> {
    RecordLayout::of(buffer, record_length)?.require_min_length("kurtosis", 2)?;
    reduce(buffer, record_length, |record| {
        record.iter().copied().collect::<RunningMoments>().kurtosis()
    })
}

/// Skewness of each record.
///
/// `sample` selects the plain sample skewness `g1`; otherwise the
/// bias-adjusted `G1` is returned.
pub fn skewness<T: Sample>(buffer: &[T], record_length: usize, sample: bool) -> Result<Vec<T>> {
    RecordLayout::of(buffer, record_length)?.require_min_length("skewness", 3)?;
    reduce(buffer, record_length, |record| {
        record
            .iter()
            .copied()
            .collect::<RunningMoments>()
            .skewness(sample)
    })
}

/// Element-wise mean across all records; returns one record.
///
/// # Example
/// ```rust
/// use wavetrace_core::reducers::average_records;
///
/// let avg = average_records(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 4).unwrap();
/// assert_eq!(avg, vec![3.0, 4.0, 5.0, 6.0]);
/// ```
pub fn average_records<T: Sample>(buffer: &[T], record_length: usize) -> Result<Vec<T>> {
    let layout = RecordLayout::of(buffer, record_length)?;
    let mut sums = vec![0.0; record_length];
    for record in buffer.chunks_exact(record_length) {
        for (sum, &x) in sums.iter_mut().zip(record) {
            *sum += x.to_f64();
        }
    }
    let count = layout.num_records() as f64;
    Ok(sums.into_iter().map(|s| T::from_f64(s / count)).collect())
}

pub(crate) fn mean_of(record: &[f64]) -> f64 {
    record.iter().sum::<f64>() / record.len() as f64
}

pub(crate) fn range_of(record: &[f64]) -> f64 {
    let (lo, hi) = record
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    hi - lo
}

/// Median of `values`, sorting them in place.
pub(crate) fn median_of_unsorted(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

/// Whether a line between `a` and `b` crosses zero; zero is non-negative.
#[inline]
pub(crate) fn crosses(a: f64, b: f64) -> bool {
    (a < 0.0) != (b < 0.0)
}
