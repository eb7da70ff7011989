//! Cubic splines: natural interpolation and Reinsch smoothing.
//!
//! # Natural Cubic Spline
//!
//! Through knots `(x_k, y_k)`, `k = 0..n`, segment `k` covers `[x_k, x_{k+1})`
//! and is evaluated at offset `h = x - x_k` as
//!
//! ```text
//! S_k(h) = a_k + h (b_k + h (c_k + h d_k))
//! ```
//!
//! with `S''(x_0) = S''(x_n) = 0`. Coefficients come from the usual
//! tridiagonal solve on the second-derivative terms.
//!
//! # Smoothing Spline
//!
//! [`smoothing_spline`] implements Reinsch's algorithm on unit spacing. It
//! finds the cubic spline `g` minimizing `∫ g''(x)² dx` subject to
//!
//! ```text
//! Σ ((g(x_i) - y_i) / δy_i)² <= S
//! ```
//!
//! where `δy_i = stdev * weight` and `S` is the smoothing parameter. `S = 0`
//! (or zero `stdev`) interpolates every sample; as `S` grows the result
//! approaches the least-squares straight line.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::cmp::Ordering;
use libm::sqrt;

use crate::error::{Result, WaveformError};

/// Minimum knot count for a cubic fit.
pub const MIN_SPLINE_KNOTS: usize = 4;

/// Iteration cap for the Reinsch Newton loop; convergence normally takes a
/// handful of steps.
const MAX_SMOOTHING_ITERATIONS: usize = 200;

/// Per-segment cubic coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCoefficients {
    knots: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl SplineCoefficients {
    /// Knot positions.
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Number of polynomial segments (`knots - 1`).
    pub fn num_segments(&self) -> usize {
        self.b.len()
    }

    /// Constant terms; `a[k]` is the spline value at knot `k`, for every
    /// knot including the last.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Linear terms.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Quadratic terms.
    pub fn c(&self) -> &[f64] {
        &self.c
    }

    /// Cubic terms.
    pub fn d(&self) -> &[f64] {
        &self.d
    }

    /// Evaluates segment `segment` at offset `h` from its left knot.
    #[inline]
    pub fn segment_value(&self, segment: usize, h: f64) -> f64 {
        self.a[segment] + h * (self.b[segment] + h * (self.c[segment] + h * self.d[segment]))
    }

    /// Segment used to evaluate `x`: the last knot at or below `x`, clamped
    /// to the first and last segments.
    pub fn segment_for(&self, x: f64) -> usize {
        let count = self.knots.partition_point(|&k| k <= x);
        count.saturating_sub(1).min(self.num_segments() - 1)
    }

    /// Evaluates the spline at `x`.
    ///
    /// Points before the first knot extend segment 0 backwards; points past
    /// the last knot extend the final segment. Extrapolated values can be
    /// far from the data.
    pub fn evaluate(&self, x: f64) -> f64 {
        let segment = self.segment_for(x);
        self.segment_value(segment, x - self.knots[segment])
    }

    /// Real roots of segment `segment`, as offsets `h` in `[0, width)` where
    /// `width` is the knot spacing.
    ///
    /// A root at the right knot belongs to the next segment and is not
    /// reported here.
    pub fn segment_roots(&self, segment: usize) -> Vec<f64> {
        let width = self.knots[segment + 1] - self.knots[segment];
        let f = |h: f64| self.segment_value(segment, h);

        let mut breaks = vec![0.0];
        let mut critical = quadratic_roots(
            3.0 * self.d[segment],
            2.0 * self.c[segment],
            self.b[segment],
        );
        critical.sort_unstable_by(f64::total_cmp);
        breaks.extend(critical.into_iter().filter(|&h| h > 0.0 && h < width));
        breaks.push(width);

        let mut roots: Vec<f64> = Vec::new();
        for pair in breaks.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let f_lo = f(lo);
            // the right knot value is exact; the polynomial only approximates it
            let f_hi = if hi == width { self.a[segment + 1] } else { f(hi) };
            let root = if f_lo == 0.0 {
                Some(lo)
            } else if f_hi != 0.0 && (f_lo < 0.0) != (f_hi < 0.0) {
                Some(bisect(f, lo, hi, f_lo))
            } else {
                None
            };
            if let Some(h) = root {
                if h < width && roots.last().is_none_or(|&last| last != h) {
                    roots.push(h);
                }
            }
        }
        roots
    }
}

/// Fits a natural cubic spline through `(x, y)`.
///
/// `x` must be strictly increasing and hold at least [`MIN_SPLINE_KNOTS`]
/// points.
///
/// # Example
/// ```rust
/// use wavetrace_core::natural_cubic_spline;
///
/// let x = [0.0, 1.0, 2.0, 3.0];
/// let y = [0.0, 1.0, 8.0, 27.0];
/// let spline = natural_cubic_spline(&x, &y).unwrap();
/// assert!((spline.evaluate(2.0) - 8.0).abs() < 1e-12);
/// ```
pub fn natural_cubic_spline(x: &[f64], y: &[f64]) -> Result<SplineCoefficients> {
    if x.len() != y.len() {
        return Err(WaveformError::LengthMismatch {
            what: "spline values",
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.len() < MIN_SPLINE_KNOTS {
        return Err(WaveformError::invalid_parameter(
            "knots",
            "a cubic spline needs at least 4 knots",
        ));
    }
    let increasing = |w: &[f64]| w[1].partial_cmp(&w[0]) == Some(Ordering::Greater);
    if x.windows(2).any(|w| !increasing(w) || !w[1].is_finite()) {
        return Err(WaveformError::invalid_parameter(
            "knots",
            "knot positions must be finite and strictly increasing",
        ));
    }

    Ok(fit_natural(x, y))
}

/// Natural spline through validated knots.
pub(crate) fn fit_natural(x: &[f64], y: &[f64]) -> SplineCoefficients {
    let n = x.len() - 1;
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let mut mu = vec![0.0; n + 1];
    let mut z = vec![0.0; n + 1];
    for i in 1..n {
        let alpha = 3.0 / h[i] * (y[i + 1] - y[i]) - 3.0 / h[i - 1] * (y[i] - y[i - 1]);
        let l = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
        mu[i] = h[i] / l;
        z[i] = (alpha - h[i - 1] * z[i - 1]) / l;
    }

    let mut c = vec![0.0; n + 1];
    let mut b = vec![0.0; n];
    let mut d = vec![0.0; n];
    for j in (0..n).rev() {
        c[j] = z[j] - mu[j] * c[j + 1];
        b[j] = (y[j + 1] - y[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
        d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
    }
    c.truncate(n);

    SplineCoefficients {
        knots: x.to_vec(),
        a: y.to_vec(),
        b,
        c,
        d,
    }
}

/// Reinsch smoothing spline through `y` at unit spacing; returns the fitted
/// values at every sample.
///
/// `stdev` and `weight` set the per-sample tolerance `δy = stdev * weight`;
/// `smoothing` is the bound `S` on the weighted residual. All three must be
/// finite and non-negative, and `y` must hold at least
/// [`MIN_SPLINE_KNOTS`] samples.
pub fn smoothing_spline(y: &[f64], stdev: f64, weight: f64, smoothing: f64) -> Result<Vec<f64>> {
    check_smoothing_parameters(stdev, weight, smoothing)?;
    if y.len() < MIN_SPLINE_KNOTS {
        return Err(WaveformError::invalid_parameter(
            "values",
            "a smoothing spline needs at least 4 samples",
        ));
    }
    let mut fitted = vec![0.0; y.len()];
    reinsch(y, stdev * weight, smoothing, &mut fitted);
    Ok(fitted)
}

/// Rejects negative or non-finite smoothing-spline parameters.
pub fn check_smoothing_parameters(stdev: f64, weight: f64, smoothing: f64) -> Result<()> {
    check_non_negative("stdev", stdev)?;
    check_non_negative("weight", weight)?;
    check_non_negative("smoothing", smoothing)
}

/// Reinsch's algorithm with uniform tolerance `dy`; `y.len() >= 4`.
pub(crate) fn reinsch(y: &[f64], dy: f64, s: f64, fitted: &mut [f64]) {
    let n = y.len();
    // Arrays are indexed from -2 through n + 1.
    const O: usize = 2;
    let size = n + 4;
    let mut r = vec![0.0; size];
    let mut r1 = vec![0.0; size];
    let mut r2 = vec![0.0; size];
    let mut t = vec![0.0; size];
    let mut t2 = vec![0.0; size];
    let mut u = vec![0.0; size];
    let mut v = vec![0.0; size];
    let mut qa = vec![0.0; size];
    let mut qb = vec![0.0; size];
    let mut qc = vec![0.0; size];
    let mut qd = vec![0.0; size];

    let x = |i: usize| i as f64;
    let (n1, n2) = (0usize, n - 1);
    let (m1, m2) = (n1 + 1, n2 - 1);

    let mut h = x(m1) - x(n1);
    let mut f = (y[m1] - y[n1]) / h;
    let mut g = 0.0;
    let mut e;
    for i in m1..=m2 {
        g = h;
        h = x(i + 1) - x(i);
        e = f;
        f = (y[i + 1] - y[i]) / h;
        qa[i + O] = f - e;
        t[i + O] = 2.0 * (g + h) / 3.0;
        t2[i + O] = h / 3.0;
        r2[i + O] = dy / g;
        r[i + O] = dy / h;
        r1[i + O] = -dy / g - dy / h;
    }
    for i in m1..=m2 {
        qb[i + O] = r[i + O] * r[i + O] + r1[i + O] * r1[i + O] + r2[i + O] * r2[i + O];
        qc[i + O] = r[i + O] * r1[i + 1 + O] + r1[i + O] * r2[i + 1 + O];
        qd[i + O] = r[i + O] * r2[i + 2 + O];
    }

    let mut f2 = -s;
    let mut p = 0.0;
    let mut iterations = 0;
    loop {
        iterations += 1;

        // LDL^T factorization and forward substitution
        for i in m1..=m2 {
            r1[i + O - 1] = f * r[i + O - 1];
            r2[i + O - 2] = g * r[i + O - 2];
            r[i + O] = 1.0
                / (p * qb[i + O] + t[i + O] - f * r1[i + O - 1] - g * r2[i + O - 2]);
            u[i + O] = qa[i + O] - r1[i + O - 1] * u[i + O - 1] - r2[i + O - 2] * u[i + O - 2];
            f = p * qc[i + O] + t2[i + O] - h * r1[i + O - 1];
            g = h;
            h = qd[i + O] * p;
        }
        // back substitution
        for i in (m1..=m2).rev() {
            u[i + O] = r[i + O] * u[i + O] - r1[i + O] * u[i + 1 + O] - r2[i + O] * u[i + 2 + O];
        }

        e = 0.0;
        h = 0.0;
        for i in n1..=m2 {
            g = h;
            h = (u[i + 1 + O] - u[i + O]) / (x(i + 1) - x(i));
            v[i + O] = (h - g) * dy * dy;
            e += v[i + O] * (h - g);
        }
        g = -h * dy * dy;
        v[n2 + O] = g;
        e -= g * h;
        g = f2;
        f2 = e * p * p;
        if f2 >= s || f2 <= g || iterations >= MAX_SMOOTHING_ITERATIONS {
            break;
        }

        f = 0.0;
        h = (v[m1 + O] - v[n1 + O]) / (x(m1) - x(n1));
        for i in m1..=m2 {
            g = h;
            h = (v[i + 1 + O] - v[i + O]) / (x(i + 1) - x(i));
            g = h - g - r1[i + O - 1] * r[i + O - 1] - r2[i + O - 2] * r[i + O - 2];
            f += g * r[i + O] * g;
            r[i + O] = g;
        }
        h = e - p * f;
        if h <= 0.0 {
            break;
        }
        p += (s - f2) / ((sqrt(s / e) + p) * h);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("smoothing_spline: {n} samples, {iterations} iterations, p = {p}");

    for (i, out) in fitted.iter_mut().enumerate() {
        *out = y[i] - p * v[i + O];
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(WaveformError::invalid_parameter(
            name,
            "must be finite and non-negative",
        ))
    }
}

/// Real roots of `a x² + b x + c`.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 {
        return if b == 0.0 { Vec::new() } else { vec![-c / b] };
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let root = if b < 0.0 { -sqrt(disc) } else { sqrt(disc) };
    let q = -0.5 * (b + root);
    if q == 0.0 {
        return vec![0.0];
    }
    vec![q / a, c / q]
}

/// Bisects a sign change of `f` on `[lo, hi]` down to floating-point
/// resolution.
fn bisect(f: impl Fn(f64) -> f64, mut lo: f64, mut hi: f64, mut f_lo: f64) -> f64 {
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return mid;
        }
        if (f_mid < 0.0) == (f_lo < 0.0) {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_knots(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn natural_spline_interpolates_knots() {
        let x = [0.0, 0.5, 1.5, 2.0, 3.5];
        let y = [1.0, -2.0, 0.5, 4.0, 3.0];
        let spline = natural_cubic_spline(&x, &y).unwrap();
        for (&xi, &yi) in x.iter().zip(&y) {
            assert!((spline.evaluate(xi) - yi).abs() < 1e-12);
        }
    }

    #[test]
    fn natural_spline_has_zero_end_curvature() {
        let x = index_knots(6);
        let y = [0.0, 2.0, -1.0, 3.0, 0.5, 1.0];
        let spline = natural_cubic_spline(&x, &y).unwrap();
        assert_eq!(spline.c()[0], 0.0);
        let last = spline.num_segments() - 1;
        // second derivative at the right end: 2c + 6d·h
        let curvature = 2.0 * spline.c()[last] + 6.0 * spline.d()[last];
        assert!(curvature.abs() < 1e-12);
    }

    #[test]
    fn natural_spline_reproduces_lines() {
        let x = index_knots(5);
        let y: Vec<f64> = x.iter().map(|&v| 2.0 * v - 1.0).collect();
        let spline = natural_cubic_spline(&x, &y).unwrap();
        assert!((spline.evaluate(-1.0) + 3.0).abs() < 1e-12);
        assert!((spline.evaluate(2.25) - 3.5).abs() < 1e-12);
        assert!((spline.evaluate(6.0) - 11.0).abs() < 1e-12);
    }

    #[test]
    fn natural_spline_rejects_bad_knots() {
        assert!(natural_cubic_spline(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).is_err());
        assert!(natural_cubic_spline(&[0.0, 1.0, 1.0, 2.0], &[0.0; 4]).is_err());
        assert!(matches!(
            natural_cubic_spline(&[0.0, 1.0, 2.0, 3.0], &[0.0; 3]),
            Err(WaveformError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn segment_lookup_clamps() {
        let spline = natural_cubic_spline(&index_knots(5), &[0.0, 1.0, 0.0, 1.0, 0.0]).unwrap();
        assert_eq!(spline.segment_for(-3.0), 0);
        assert_eq!(spline.segment_for(0.0), 0);
        assert_eq!(spline.segment_for(2.5), 2);
        assert_eq!(spline.segment_for(4.0), 3);
        assert_eq!(spline.segment_for(9.0), 3);
    }

    #[test]
    fn segment_roots_find_close_pair() {
        let y = [
            0.0, -0.5, 0.23, 0.95, -0.14, -0.02, -0.02, -0.21, 0.32, 0.25, 0.5, -1.13, -1.44,
            -0.1, -0.38414905,
        ];
        let spline = natural_cubic_spline(&index_knots(y.len()), &y).unwrap();
        let roots = spline.segment_roots(13);
        assert_eq!(roots.len(), 2, "{roots:?}");
        assert!((roots[0] - 0.28099249958110384).abs() < 1e-9);
        assert!((roots[1] - 0.28200724341862093).abs() < 1e-9);
    }

    #[test]
    fn segment_roots_exclude_right_knot() {
        let spline =
            natural_cubic_spline(&index_knots(4), &[1.0, 0.0, -1.0, 0.5]).unwrap();
        assert_eq!(spline.segment_roots(0), Vec::<f64>::new());
        assert_eq!(spline.segment_roots(1), vec![0.0]);
    }

    #[test]
    fn quadratic_roots_cases() {
        assert!(quadratic_roots(1.0, 0.0, 1.0).is_empty());
        assert_eq!(quadratic_roots(0.0, 2.0, -4.0), vec![2.0]);
        let mut r = quadratic_roots(1.0, -3.0, 2.0);
        r.sort_unstable_by(f64::total_cmp);
        assert!((r[0] - 1.0).abs() < 1e-15 && (r[1] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn smoothing_zero_interpolates() {
        let y = [1.0, 3.0, -2.0, 4.0, 0.5, 2.0, -1.0];
        assert_eq!(smoothing_spline(&y, 1.0, 1.0, 0.0).unwrap(), y.to_vec());
        assert_eq!(smoothing_spline(&y, 0.0, 1.0, 5.0).unwrap(), y.to_vec());
    }

    #[test]
    fn smoothing_meets_residual_bound() {
        let y: Vec<f64> = (0..40)
            .map(|i| 0.5 * i as f64 + if i % 3 == 0 { 1.0 } else { -0.5 })
            .collect();
        let s = 10.0;
        let fitted = smoothing_spline(&y, 1.0, 1.0, s).unwrap();
        let residual: f64 = fitted.iter().zip(&y).map(|(a, b)| (a - b) * (a - b)).sum();
        assert!((residual - s).abs() < 1e-6 * s, "residual {residual}");
    }

    #[test]
    fn large_smoothing_approaches_line() {
        let y: Vec<f64> = (0..30)
            .map(|i| 2.0 - 0.25 * i as f64 + if i % 2 == 0 { 0.75 } else { -0.75 })
            .collect();
        let fitted = smoothing_spline(&y, 1.0, 1.0, 1e9).unwrap();
        let second_diff = fitted
            .windows(3)
            .map(|w| (w[0] - 2.0 * w[1] + w[2]).abs())
            .fold(0.0, f64::max);
        assert!(second_diff < 1e-6, "max second difference {second_diff}");
    }

    #[test]
    fn smoothing_rejects_negative_parameters() {
        let y = [0.0; 8];
        assert!(smoothing_spline(&y, -1.0, 1.0, 1.0).is_err());
        assert!(smoothing_spline(&y, 1.0, 1.0, -1.0).is_err());
        assert!(smoothing_spline(&y[..3], 1.0, 1.0, 1.0).is_err());
    }
}
