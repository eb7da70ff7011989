//! Record arithmetic: baseline removal, element-wise combination, and
//! binomial smoothing.

use crate::error::{Result, WaveformError};
use crate::records::{RecordLayout, transform_records};
use crate::reducers::{mean_of, median_of_unsorted};
use crate::sample::Sample;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Baseline removed by [`subtract_baseline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Baseline {
    /// Record mean.
    #[default]
    Mean,
    /// Record median.
    Median,
    /// Least-squares line over the sample index.
    LinearFit,
}

/// Element-wise operation applied by [`combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombineOp {
    /// `record + reference`
    Add,
    /// `record - reference`
    Subtract,
    /// `record * reference`
    Multiply,
    /// `record / reference`; zeros in the reference give IEEE infinities or NaN.
    Divide,
}

impl CombineOp {
    #[inline]
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            CombineOp::Add => a + b,
            CombineOp::Subtract => a - b,
            CombineOp::Multiply => a * b,
            CombineOp::Divide => a / b,
        }
    }
}

/// Closed-form least-squares line over `x = 0..n`.
///
/// The index sums depend only on `n`, so they are computed once and reused
/// for every record.
#[derive(Debug, Clone, Copy)]
struct IndexLineFit {
    n: f64,
    sum_x: f64,
    denominator: f64,
}

impl IndexLineFit {
    fn new(len: usize) -> Self {
        let n = len as f64;
        let sum_x = n * (n - 1.0) / 2.0;
        let sum_xx = sum_x * (2.0 * n - 1.0) / 3.0;
        Self {
            n,
            sum_x,
            denominator: n * sum_xx - sum_x * sum_x,
        }
    }

    /// `(slope, intercept)` of the fit through `y`.
    fn fit(&self, y: &[f64]) -> (f64, f64) {
        let (sum_y, sum_xy) = y
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sy, sxy), (i, &v)| (sy + v, sxy + i as f64 * v));
        let slope = (self.n * sum_xy - self.sum_x * sum_y) / self.denominator;
        let intercept = (sum_y - slope * self.sum_x) / self.n;
        (slope, intercept)
    }
}

/// Subtracts a per-record baseline in place.
///
/// A linear fit needs at least two samples per record.
///
/// # Example
/// ```rust
/// use wavetrace_core::{Baseline, subtract_baseline};
///
/// let mut data = [1.0, 2.0, 3.0, 10.0, 10.0, 13.0];
/// subtract_baseline(&mut data, 3, Baseline::Mean).unwrap();
/// assert_eq!(data, [-1.0, 0.0, 1.0, -1.0, -1.0, 2.0]);
/// ```
pub fn subtract_baseline<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    baseline: Baseline,
) -> Result<()> {
    let layout = RecordLayout::of(buffer, record_length)?;
    match baseline {
        Baseline::Mean => transform_records(buffer, layout, |input, output| {
            let mean = mean_of(input);
            for (o, &x) in output.iter_mut().zip(input) {
                *o = x - mean;
            }
        }),
        Baseline::Median => {
            let mut sorted = Vec::with_capacity(record_length);
            transform_records(buffer, layout, |input, output| {
                sorted.clear();
                sorted.extend_from_slice(input);
                let median = median_of_unsorted(&mut sorted);
                for (o, &x) in output.iter_mut().zip(input) {
                    *o = x - median;
                }
            });
        }
        Baseline::LinearFit => {
            layout.require_min_length("linear baseline fit", 2)?;
            let line = IndexLineFit::new(record_length);
            transform_records(buffer, layout, |input, output| {
                let (slope, intercept) = line.fit(input);
                for (i, (o, &x)) in output.iter_mut().zip(input).enumerate() {
                    *o = x - (intercept + slope * i as f64);
                }
            });
        }
    }
    Ok(())
}

/// Combines every record element-wise with `reference`, in place.
///
/// `reference` must be exactly one record long.
pub fn combine<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    reference: &[T],
    op: CombineOp,
) -> Result<()> {
    let layout = RecordLayout::of(buffer, record_length)?;
    if reference.len() != record_length {
        return Err(WaveformError::LengthMismatch {
            what: "reference record",
            expected: record_length,
            actual: reference.len(),
        });
    }
    let reference: Vec<f64> = reference.iter().map(|x| x.to_f64()).collect();
    transform_records(buffer, layout, |input, output| {
        for ((o, &x), &r) in output.iter_mut().zip(input).zip(&reference) {
            *o = op.apply(x, r);
        }
    });
    Ok(())
}

/// Applies `passes` rounds of the `[1, 2, 1] / 4` kernel to every record.
///
/// Endpoints are mirrored (`x[-1] = x[1]`), so the first output is
/// `(x[0] + x[1]) / 2`. Zero passes leave the buffer untouched. Records need
/// at least three samples.
pub fn binomial_filter<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    passes: usize,
) -> Result<()> {
    let layout =
        RecordLayout::of(buffer, record_length)?.require_min_length("binomial filter", 3)?;
    if passes == 0 {
        return Ok(());
    }
    let last = record_length - 1;
    transform_records(buffer, layout, |input, output| {
        output.copy_from_slice(input);
        for _ in 0..passes {
            let mut previous = output[0];
            output[0] = 0.5 * (output[0] + output[1]);
            for j in 1..last {
                let current = output[j];
                output[j] = 0.25 * (previous + 2.0 * current + output[j + 1]);
                previous = current;
            }
            output[last] = 0.5 * (previous + output[last]);
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: [f64; 16] = [
        1.0, 5.0, 2.0, 3.0, 2.2, -1.0, 4.0, 5.0, 0.0, 0.0, 3.2, -0.5, 1.1, 2.2, 1.1, 4.0,
    ];

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() <= tol, "index {i}: {a} vs {e}");
        }
    }

    #[test]
    fn subtract_mean() {
        let mut data = MIXED;
        subtract_baseline(&mut data, 8, Baseline::Mean).unwrap();
        assert_close(
            &data,
            &[
                -1.65, 2.35, -0.65, 0.35, -0.45, -3.65, 1.35, 2.35, -1.3875, -1.3875, 1.8125,
                -1.8875, -0.2875, 0.8125, -0.2875, 2.6125,
            ],
            1e-12,
        );
    }

    #[test]
    fn subtract_median() {
        let mut data = MIXED;
        subtract_baseline(&mut data, 8, Baseline::Median).unwrap();
        assert_close(
            &data,
            &[
                -1.6, 2.4, -0.6, 0.4, -0.4, -3.6, 1.4, 2.4, -1.1, -1.1, 2.1, -1.6, 0.0, 1.1, 0.0,
                2.9,
            ],
            1e-12,
        );
    }

    #[test]
    fn subtract_linear_fit() {
        let mut data = MIXED;
        subtract_baseline(&mut data, 8, Baseline::LinearFit).unwrap();
        assert_close(
            &data,
            &[
                -1.1,
                2.7428571428571424,
                -0.4142857142857146,
                0.42857142857142794,
                -0.5285714285714289,
                -3.885714285714286,
                0.9571428571428564,
                1.8,
                -0.05,
                -0.4321428571428576,
                2.3857142857142852,
                -1.6964285714285718,
                -0.47857142857142887,
                0.2392857142857141,
                -1.2428571428571433,
                1.275,
            ],
            1e-12,
        );
    }

    #[test]
    fn linear_fit_removes_exact_line() {
        let mut data: Vec<f64> = (0..10).map(|i| 3.0 - 0.5 * f64::from(i)).collect();
        subtract_baseline(&mut data, 10, Baseline::LinearFit).unwrap();
        assert!(data.iter().all(|x| x.abs() < 1e-12));
        assert!(subtract_baseline(&mut [1.0, 2.0], 1, Baseline::LinearFit).is_err());
    }

    #[test]
    fn combine_with_self() {
        let mut sum = MIXED;
        combine(&mut sum, 16, &MIXED, CombineOp::Add).unwrap();
        let mut difference = MIXED;
        combine(&mut difference, 16, &MIXED, CombineOp::Subtract).unwrap();
        let mut product = MIXED;
        combine(&mut product, 16, &MIXED, CombineOp::Multiply).unwrap();
        for (i, &x) in MIXED.iter().enumerate() {
            assert_eq!(sum[i], 2.0 * x);
            assert_eq!(difference[i], 0.0);
            assert_eq!(product[i], x * x);
        }

        let mut quotient = MIXED;
        combine(&mut quotient, 16, &MIXED, CombineOp::Divide).unwrap();
        for (out, &x) in quotient.iter().zip(&MIXED) {
            if x == 0.0 {
                assert!(out.is_nan());
            } else {
                assert_eq!(*out, 1.0);
            }
        }
    }

    #[test]
    fn combine_broadcasts_reference() {
        let mut data = MIXED;
        combine(&mut data, 8, &MIXED[..8], CombineOp::Divide).unwrap();
        assert_close(
            &data,
            &[
                1.0,
                1.0,
                1.0,
                1.0,
                1.0,
                1.0,
                1.0,
                1.0,
                0.0,
                0.0,
                1.6,
                -0.1666666666666667,
                0.5,
                -2.2,
                0.275,
                0.8,
            ],
            1e-12,
        );
    }

    #[test]
    fn combine_rejects_wrong_reference() {
        let mut data = MIXED;
        let err = combine(&mut data, 8, &MIXED[..7], CombineOp::Add).unwrap_err();
        assert_eq!(
            err,
            WaveformError::LengthMismatch {
                what: "reference record",
                expected: 8,
                actual: 7
            }
        );
        assert_eq!(data, MIXED);
    }

    #[test]
    fn binomial_two_passes() {
        let mut data = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 2.0, 5.0, 1.0];
        binomial_filter(&mut data, 6, 2).unwrap();
        assert_close(
            &data,
            &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.75, 2.0, 2.5, 2.9375, 3.125, 3.125],
            1e-15,
        );
    }

    #[test]
    fn binomial_zero_passes_is_identity() {
        let mut data = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 2.0, 5.0, 1.0];
        let before = data;
        binomial_filter(&mut data, 6, 0).unwrap();
        assert_eq!(data, before);
        assert!(binomial_filter(&mut data, 2, 1).is_err());
    }
}
