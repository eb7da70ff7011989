//! Sub-sample zero-crossing locations.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::error::Result;
use crate::records::{RecordLayout, reduce_records};
use crate::sample::Sample;
use crate::spline::{MIN_SPLINE_KNOTS, fit_natural};

/// How the waveform is reconstructed between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Interpolation {
    /// Straight lines between adjacent samples.
    #[default]
    Linear,
    /// Natural cubic spline through every sample.
    CubicSpline,
}

/// A zero crossing at `index + offset`, with `offset` in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroCrossing {
    /// Sample at or before the crossing.
    pub index: usize,
    /// Fractional distance past `index`.
    pub offset: f64,
}

impl ZeroCrossing {
    /// Crossing position in fractional samples.
    pub fn position(&self) -> f64 {
        self.index as f64 + self.offset
    }
}

/// Locates every zero crossing in each record.
///
/// Samples that are exactly zero are reported with offset 0. Between
/// samples, linear interpolation reports one crossing per strict sign
/// change; spline interpolation reports every real root of each spline
/// segment, which can include crossings the samples alone do not show.
/// Spline interpolation needs records of at least four samples.
///
/// # Example
/// ```rust
/// use wavetrace_core::{Interpolation, zero_crossing_locations};
///
/// let data = [0.0, 2.0, -0.5, -1.0];
/// let found = zero_crossing_locations(&data, 4, Interpolation::Linear).unwrap();
/// assert_eq!(found[0].len(), 2);
/// assert!((found[0][1].position() - 1.8).abs() < 1e-12);
/// ```
pub fn zero_crossing_locations<T: Sample>(
    buffer: &[T],
    record_length: usize,
    interpolation: Interpolation,
) -> Result<Vec<Vec<ZeroCrossing>>> {
    let layout = RecordLayout::of(buffer, record_length)?;
    match interpolation {
        Interpolation::Linear => Ok(reduce_records(buffer, layout, linear_crossings)),
        Interpolation::CubicSpline => {
            layout.require_min_length("spline zero crossings", MIN_SPLINE_KNOTS)?;
            let knots: Vec<f64> = (0..record_length).map(|i| i as f64).collect();
            Ok(reduce_records(buffer, layout, |record| {
                spline_crossings(&knots, record)
            }))
        }
    }
}

fn linear_crossings(record: &[f64]) -> Vec<ZeroCrossing> {
    let mut found = Vec::new();
    for (index, pair) in record.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        if a == 0.0 {
            found.push(ZeroCrossing { index, offset: 0.0 });
        } else if a * b < 0.0 {
            found.push(ZeroCrossing {
                index,
                offset: a / (a - b),
            });
        }
    }
    push_trailing_zero(record, &mut found);
    found
}

fn spline_crossings(knots: &[f64], record: &[f64]) -> Vec<ZeroCrossing> {
    let spline = fit_natural(knots, record);
    let mut found = vec![];
    for index in 0..spline.num_segments() {
        found.extend(
            spline
                .segment_roots(index)
                .into_iter()
                .map(|offset| ZeroCrossing { index, offset }),
        );
    }
    push_trailing_zero(record, &mut found);
    found
}

fn push_trailing_zero(record: &[f64], found: &mut Vec<ZeroCrossing>) {
    let last = record.len() - 1;
    if record[last] == 0.0 {
        found.push(ZeroCrossing {
            index: last,
            offset: 0.0,
        });
    }
}
