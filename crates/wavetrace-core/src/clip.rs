//! Spline repair of clipped samples and per-record spline smoothing.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::fabs;

use crate::error::{Result, WaveformError};
use crate::records::{RecordLayout, transform_records};
use crate::sample::Sample;
use crate::spline::{MIN_SPLINE_KNOTS, check_smoothing_parameters, fit_natural, reinsch};

/// Replaces clipped samples with a natural cubic spline through the rest.
///
/// Samples with `|x| < threshold` are kept as knots. Every other sample is
/// re-evaluated from the spline, extrapolating before the first and after
/// the last knot; extrapolated runs can stray far from the data. A record
/// with fewer than four valid samples cannot carry a cubic and is zeroed.
///
/// # Example
/// ```rust
/// use wavetrace_core::repair_clipped;
///
/// let mut data = [0.0, 0.5, 1.0, 1.0, 1.0, 0.5, 0.0, -0.5];
/// repair_clipped(&mut data, 8, 1.0).unwrap();
/// assert_eq!(data[1], 0.5);
/// assert!(data[2] != 1.0 && data[3] != 1.0);
/// ```
pub fn repair_clipped<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    threshold: f64,
) -> Result<()> {
    let layout = RecordLayout::of(buffer, record_length)?
        .require_min_length("clip repair", MIN_SPLINE_KNOTS)?;
    if !(threshold.is_finite() && threshold >= 0.0) {
        return Err(WaveformError::invalid_parameter(
            "threshold",
            "must be finite and non-negative",
        ));
    }

    let mut knots_x = Vec::with_capacity(record_length);
    let mut knots_y = Vec::with_capacity(record_length);
    transform_records(buffer, layout, |input, output| {
        knots_x.clear();
        knots_y.clear();
        for (j, &v) in input.iter().enumerate() {
            if fabs(v) < threshold {
                knots_x.push(j as f64);
                knots_y.push(v);
            }
        }

        if knots_x.len() < MIN_SPLINE_KNOTS {
            output.fill(0.0);
            return;
        }
        output.copy_from_slice(input);
        if knots_x.len() == record_length {
            return;
        }

        let spline = fit_natural(&knots_x, &knots_y);
        for (j, out) in output.iter_mut().enumerate() {
            if !(fabs(input[j]) < threshold) {
                *out = spline.evaluate(j as f64);
            }
        }
    });
    Ok(())
}

/// Replaces every record with its Reinsch smoothing spline.
///
/// `smoothing = 0` (or `stdev = 0`) reproduces the record; very large values
/// flatten it toward its least-squares line. See
/// [`smoothing_spline`](crate::smoothing_spline).
pub fn smooth_with_spline<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    smoothing: f64,
    stdev: f64,
) -> Result<()> {
    let layout = RecordLayout::of(buffer, record_length)?
        .require_min_length("spline smoothing", MIN_SPLINE_KNOTS)?;
    check_smoothing_parameters(stdev, 1.0, smoothing)?;
    transform_records(buffer, layout, |input, output| {
        reinsch(input, stdev, smoothing, output);
    });
    Ok(())
}
