//! Align records to a seed waveform by circular cross-correlation.

use std::ops::Range;

use wavetrace_core::{RecordLayout, Result, Sample, WaveformError, transform_records};

use crate::fft::{Fft, padded_length};
use crate::xcorr::{peak_lag, xcorr_spectra};

/// Rotates every record so it best matches `seed[range]`.
///
/// The seed is zeroed outside `range` and both seed and records are
/// zero-padded to the next power of two before correlating. Each record is
/// then rotated circularly (positive lags to the right) as a whole, not just
/// the matched segment. Returns the lag applied to each record.
///
/// # Example
/// ```rust
/// use wavetrace_analysis::align;
///
/// let mut data = [2.0, 3.0, 2.0, 5.0, 1.0, 0.0, 2.0, 1.0, 6.0, 1.0, 0.0, 1.0];
/// let seed = [2.0, 3.0, 2.0, 5.0, 1.0, 0.0];
/// let lags = align(&mut data, 6, &seed, 0..6).unwrap();
/// assert_eq!(lags, vec![0, 1]);
/// assert_eq!(data[6..], [1.0, 2.0, 1.0, 6.0, 1.0, 0.0]);
/// ```
pub fn align<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    seed: &[T],
    range: Range<usize>,
) -> Result<Vec<isize>> {
    let layout = RecordLayout::of(buffer, record_length)?;
    if seed.len() != record_length {
        return Err(WaveformError::LengthMismatch {
            what: "seed waveform",
            expected: record_length,
            actual: seed.len(),
        });
    }
    if range.is_empty() || range.end > record_length {
        return Err(WaveformError::invalid_parameter(
            "range",
            format!("{range:?} must be non-empty and within 0..{record_length}"),
        ));
    }

    let padded = padded_length(record_length);
    let fft = Fft::new(padded);
    let mut masked = vec![0.0; record_length];
    for i in range {
        masked[i] = seed[i].to_f64();
    }
    let seed_spectrum = fft.forward_real(&masked);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "align: {} records of {record_length}, padded to {padded}",
        layout.num_records()
    );

    let mut lags = Vec::with_capacity(layout.num_records());
    transform_records(buffer, layout, |input, output| {
        let spectrum = fft.forward_real(input);
        let lag = peak_lag(&xcorr_spectra(&fft, &spectrum, &seed_spectrum));
        output.copy_from_slice(input);
        rotate(output, lag);
        lags.push(lag);
    });
    Ok(lags)
}

/// Circular rotation; positive `shift` moves samples to higher indices.
fn rotate(record: &mut [f64], shift: isize) {
    let len = record.len() as isize;
    if len == 0 {
        return;
    }
    let shift = shift.rem_euclid(len) as usize;
    record.rotate_right(shift);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_rotated_record() {
        let mut data = [2.0, 3.0, 2.0, 5.0, 1.0, 0.0, 2.0, 1.0, 6.0, 1.0, 0.0, 1.0];
        let seed = [2.0, 3.0, 2.0, 5.0, 1.0, 0.0];
        align(&mut data, 6, &seed, 0..6).unwrap();
        assert_eq!(
            data,
            [2.0, 3.0, 2.0, 5.0, 1.0, 0.0, 1.0, 2.0, 1.0, 6.0, 1.0, 0.0]
        );
    }

    #[test]
    fn negative_lag_rotates_left() {
        let seed = [0.0f32, 0.0, 1.0, 5.0, 1.0, 0.0, 0.0, 0.0];
        let mut data = [0.0f32, 0.0, 0.0, 0.0, 1.0, 5.0, 1.0, 0.0];
        let lags = align(&mut data, 8, &seed, 0..8).unwrap();
        assert_eq!(lags, vec![-2]);
        assert_eq!(data, seed);
    }

    #[test]
    fn rotation_wraps() {
        let mut r = [1.0, 2.0, 3.0, 4.0];
        rotate(&mut r, 1);
        assert_eq!(r, [4.0, 1.0, 2.0, 3.0]);
        rotate(&mut r, -3);
        assert_eq!(r, [3.0, 4.0, 1.0, 2.0]);
        rotate(&mut r, 4);
        assert_eq!(r, [3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn rejects_bad_seed_and_range() {
        let mut data = [1.0; 8];
        assert!(align(&mut data, 4, &[1.0; 3], 0..3).is_err());
        assert!(align(&mut data, 4, &[1.0; 4], 2..2).is_err());
        assert!(align(&mut data, 4, &[1.0; 4], 1..5).is_err());
        assert_eq!(data, [1.0; 8]);
    }
}
