//! Moving-window statistics over each record.
//!
//! A window of radius `r` spans `2r + 1` samples centred on each output
//! index. Taps that fall outside the record are mirrored about the nearest
//! endpoint (see [`mirror_index`]); nothing is zero-padded. Every operation
//! requires `2r + 1 <= record_length` and works in place.
//!
//! | Operation | Output at index `i` | `r = 0` |
//! |-----------|---------------------|---------|
//! | [`weighted_average`] | `Σ w_|k| x[i+k]` | identity |
//! | [`sum_of_squares`] | `Σ (w_|k| x[i+k])²`, optionally `log10` | `x²` |
//! | [`variance`] | unweighted window variance | `0` |
//! | [`median`] | window median | identity |
//! | [`zero_crossing_count`] | sign changes between adjacent taps | `0` |
//! | [`range`] | window `max - min` | `0` |
//!
//! Weights `w_k` are the normalized single-sided weights of the chosen
//! [`Window`].

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::{fabs, log10};

use crate::error::Result;
use crate::records::{RecordLayout, mirror_index, transform_records};
use crate::reducers::{crosses, median_of_unsorted};
use crate::sample::Sample;
use crate::window::Window;

/// Sample at signed `offset` from `center`, mirrored into the record.
#[inline]
fn tap(record: &[f64], center: usize, offset: isize) -> f64 {
    record[mirror_index(center as isize + offset, record.len())]
}

fn validated(buffer_len: usize, record_length: usize, radius: usize) -> Result<RecordLayout> {
    RecordLayout::new(buffer_len, record_length)?.require_radius(radius)
}

/// Weighted moving average.
///
/// # Example
/// ```rust
/// use wavetrace_core::{Window, sliding};
///
/// let mut data: [f64; 5] = [1.0, 5.0, 2.0, 3.0, 2.2];
/// sliding::weighted_average(&mut data, 5, 2, Window::Rectangle).unwrap();
/// assert!((data[0] - 3.0).abs() < 1e-12);
/// ```
pub fn weighted_average<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    radius: usize,
    window: Window,
) -> Result<()> {
    let layout = validated(buffer.len(), record_length, radius)?;
    let weights = window.weights_single_sided(radius, true)?;
    let r = radius as isize;
    transform_records(buffer, layout, |input, output| {
        for (i, out) in output.iter_mut().enumerate() {
            let mut sum = weights[0] * input[i];
            for k in 1..=r {
                sum += weights[k as usize] * (tap(input, i, -k) + tap(input, i, k));
            }
            *out = sum;
        }
    });
    Ok(())
}

/// Weighted moving sum of squares; `log_output` replaces each value by its
/// `log10`.
pub fn sum_of_squares<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    radius: usize,
    window: Window,
    log_output: bool,
) -> Result<()> {
    let layout = validated(buffer.len(), record_length, radius)?;
    let squared: Vec<f64> = window
        .weights_single_sided(radius, true)?
        .into_iter()
        .map(|w| w * w)
        .collect();
    let r = radius as isize;
    transform_records(buffer, layout, |input, output| {
        for (i, out) in output.iter_mut().enumerate() {
            let x = input[i];
            let mut sum = squared[0] * x * x;
            for k in 1..=r {
                let (a, b) = (tap(input, i, -k), tap(input, i, k));
                sum += squared[k as usize] * (a * a + b * b);
            }
            *out = if log_output { log10(sum) } else { sum };
        }
    });
    Ok(())
}

/// Moving variance with equal weights.
///
/// `unbiased` divides by `2r` instead of `2r + 1`. A zero radius yields zeros.
pub fn variance<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    radius: usize,
    unbiased: bool,
) -> Result<()> {
    let layout = validated(buffer.len(), record_length, radius)?;
    let r = radius as isize;
    let count = (2 * radius + 1) as f64;
    let divisor = if unbiased { count - 1.0 } else { count };
    transform_records(buffer, layout, |input, output| {
        if radius == 0 {
            output.fill(0.0);
            return;
        }
        for (i, out) in output.iter_mut().enumerate() {
            let mean = (-r..=r).map(|k| tap(input, i, k)).sum::<f64>() / count;
            let ss: f64 = (-r..=r)
                .map(|k| {
                    let d = tap(input, i, k) - mean;
                    d * d
                })
                .sum();
            *out = ss / divisor;
        }
    });
    Ok(())
}

/// Number of sign changes between adjacent taps of each window.
///
/// Counts are written back into the buffer.
pub fn zero_crossing_count<T: Sample>(
    buffer: &mut [T],
    record_length: usize,
    radius: usize,
) -> Result<()> {
    let layout = validated(buffer.len(), record_length, radius)?;
    let r = radius as isize;
    transform_records(buffer, layout, |input, output| {
        for (i, out) in output.iter_mut().enumerate() {
            let count = (-r..r)
                .filter(|&k| crosses(tap(input, i, k), tap(input, i, k + 1)))
                .count();
            *out = count as f64;
        }
    });
    Ok(())
}

/// Moving range (`max - min`).
pub fn range<T: Sample>(buffer: &mut [T], record_length: usize, radius: usize) -> Result<()> {
    let layout = validated(buffer.len(), record_length, radius)?;
    let r = radius as isize;
    transform_records(buffer, layout, |input, output| {
        for (i, out) in output.iter_mut().enumerate() {
            let (lo, hi) = (-r..=r).map(|k| tap(input, i, k)).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), x| (lo.min(x), hi.max(x)),
            );
            *out = hi - lo;
        }
    });
    Ok(())
}

/// Moving median.
///
/// Tracks the median incrementally (Friedman and Stuetzle): after the first
/// window is sorted, each slide compares the entering and leaving samples
/// with the current median and rescans the window only when the median has
/// to move. Results are identical to re-sorting every window.
pub fn median<T: Sample>(buffer: &mut [T], record_length: usize, radius: usize) -> Result<()> {
    let layout = validated(buffer.len(), record_length, radius)?;
    if radius == 0 {
        return Ok(());
    }
    let mut tracker = MedianTracker::new(radius);
    transform_records(buffer, layout, |input, output| {
        tracker.run(input, output);
    });
    Ok(())
}

/// Where a sample sits relative to the current median.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Below,
    At,
    Above,
}

impl Side {
    fn of(x: f64, median: f64) -> Self {
        if x > median {
            Side::Above
        } else if x < median {
            Side::Below
        } else {
            Side::At
        }
    }
}

/// What a single slide can do to the median.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Median cannot change.
    Hold,
    /// Median may move to the nearest larger value.
    Up { leaving_at_median: bool },
    /// Median may move to the nearest smaller value.
    Down { leaving_at_median: bool },
}

impl Step {
    fn classify(entering: Side, leaving: Side) -> Self {
        match (entering, leaving) {
            (Side::Above, Side::Below) => Step::Up {
                leaving_at_median: false,
            },
            (Side::Above, Side::At) => Step::Up {
                leaving_at_median: true,
            },
            (Side::Below, Side::Above) => Step::Down {
                leaving_at_median: false,
            },
            (Side::Below, Side::At) => Step::Down {
                leaving_at_median: true,
            },
            _ => Step::Hold,
        }
    }
}

/// Window scan in one direction from the current median.
struct Scan {
    /// Samples strictly beyond the median.
    beyond: usize,
    /// Beyond-sample closest to the median.
    nearest: f64,
    /// Whether any sample equals the median.
    equal: bool,
}

struct MedianTracker {
    radius: usize,
    sorted: Vec<f64>,
}

impl MedianTracker {
    fn new(radius: usize) -> Self {
        Self {
            radius,
            sorted: Vec::with_capacity(2 * radius + 1),
        }
    }

    fn run(&mut self, input: &[f64], output: &mut [f64]) {
        let r = self.radius as isize;
        self.sorted.clear();
        self.sorted.extend((-r..=r).map(|k| tap(input, 0, k)));
        let mut current = median_of_unsorted(&mut self.sorted);
        output[0] = current;

        for j in 1..input.len() {
            let entering = tap(input, j, r);
            let leaving = tap(input, j, -r - 1);
            let step = Step::classify(Side::of(entering, current), Side::of(leaving, current));
            current = match step {
                Step::Hold => current,
                Step::Up { leaving_at_median } => {
                    let scan = Self::scan(input, j, r, current, |x, m| x > m);
                    self.resolve(current, &scan, leaving_at_median)
                }
                Step::Down { leaving_at_median } => {
                    let scan = Self::scan(input, j, r, current, |x, m| x < m);
                    self.resolve(current, &scan, leaving_at_median)
                }
            };
            output[j] = current;
        }
    }

    fn scan(
        input: &[f64],
        center: usize,
        r: isize,
        median: f64,
        beyond: impl Fn(f64, f64) -> bool,
    ) -> Scan {
        let mut scan = Scan {
            beyond: 0,
            nearest: median,
            equal: false,
        };
        let mut best = f64::INFINITY;
        for k in -r..=r {
            let x = tap(input, center, k);
            if beyond(x, median) {
                scan.beyond += 1;
                let distance = fabs(x - median);
                if distance < best {
                    best = distance;
                    scan.nearest = x;
                }
            } else if x == median {
                scan.equal = true;
            }
        }
        scan
    }

    fn resolve(&self, current: f64, scan: &Scan, leaving_at_median: bool) -> f64 {
        let half = self.radius + 1;
        if leaving_at_median {
            if scan.beyond == half || !scan.equal {
                scan.nearest
            } else {
                current
            }
        } else if scan.beyond >= half {
            scan.nearest
        } else {
            current
        }
    }
}
