//! Symmetric tapering windows used as moving-window weights.
//!
//! Every window is a shape `w(t)` over normalized position `t` in `(-1, 1)`,
//! peaking at `t = 0`. A full window of `N` taps samples the shape at
//!
//! ```text
//! t_n = (2n - (N - 1)) / (N + 1),   n = 0..N
//! ```
//!
//! so the endpoints never reach zero. A single-sided window of radius `r`
//! holds the `r + 1` weights from the center outward (`t_k = k / (r + 1)`);
//! mirrored about the center it reproduces the full window of `2r + 1` taps.
//!
//! | Window | Shape `w(t)` | Parameter |
//! |--------|--------------|-----------|
//! | [`Window::Rectangle`] | `1` | - |
//! | [`Window::Bartlett`] | `1 - \|t\|` | - |
//! | [`Window::Welch`] | `1 - t²` | - |
//! | [`Window::Hanning`] | `0.5 (1 + cos πt)` | - |
//! | [`Window::Hamming`] | `0.54 + 0.46 cos πt` | - |
//! | [`Window::Blackman`] | `0.42 + 0.5 cos πt + 0.08 cos 2πt` | - |
//! | [`Window::Cosine`] | `cos(πt / 2)` | - |
//! | [`Window::Gaussian`] | `exp(-½ (t/σ)²)` | `sigma > 0` |
//! | [`Window::Tukey`] | flat top, cosine tapers over the outer `alpha` | `0 <= alpha <= 1` |
//! | [`Window::Kaiser`] | `I0(β √(1 - t²)) / I0(β)` | `beta >= 0` |

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::PI;
use libm::{cos, exp, fabs, sqrt};

use crate::error::{Result, WaveformError};

/// Window function selection, with the shape parameter for windows that use one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Window {
    /// Uniform weights.
    #[default]
    Rectangle,
    /// Triangular window.
    Bartlett,
    /// Parabolic window.
    Welch,
    /// Raised cosine.
    Hanning,
    /// Raised cosine on a pedestal.
    Hamming,
    /// Three-term Blackman window.
    Blackman,
    /// Half-period cosine.
    Cosine,
    /// Gaussian bell; `sigma` is relative to the window half-width.
    Gaussian {
        /// Standard deviation in units of the half-width.
        sigma: f64,
    },
    /// Tapered cosine; `alpha = 0` is rectangular, `alpha = 1` is Hanning.
    Tukey {
        /// Fraction of the half-width covered by the cosine taper.
        alpha: f64,
    },
    /// Kaiser-Bessel window.
    Kaiser {
        /// Shape parameter; larger values narrow the main lobe.
        beta: f64,
    },
}

impl Window {
    /// Names accepted by [`Window::from_name`].
    pub const NAMES: &'static [&'static str] = &[
        "rectangle",
        "bartlett",
        "welch",
        "hanning",
        "hamming",
        "blackman",
        "cosine",
        "gaussian",
        "tukey",
        "kaiser",
    ];

    /// Builds a window from its name and a shape parameter.
    ///
    /// The parameter is ignored by windows that do not use one.
    ///
    /// # Example
    /// ```rust
    /// use wavetrace_core::Window;
    ///
    /// assert_eq!(Window::from_name("hanning", 0.0).unwrap(), Window::Hanning);
    /// assert_eq!(
    ///     Window::from_name("tukey", 0.5).unwrap(),
    ///     Window::Tukey { alpha: 0.5 }
    /// );
    /// assert!(Window::from_name("gaussian", -1.0).is_err());
    /// ```
    pub fn from_name(name: &str, parameter: f64) -> Result<Self> {
        let window = match name.to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Window::Rectangle,
            "bartlett" => Window::Bartlett,
            "welch" => Window::Welch,
            "hanning" | "hann" => Window::Hanning,
            "hamming" => Window::Hamming,
            "blackman" => Window::Blackman,
            "cosine" => Window::Cosine,
            "gaussian" => Window::Gaussian { sigma: parameter },
            "tukey" => Window::Tukey { alpha: parameter },
            "kaiser" => Window::Kaiser { beta: parameter },
            _ => {
                return Err(WaveformError::invalid_parameter(
                    "window",
                    "unknown window name",
                ));
            }
        };
        window.validate()?;
        Ok(window)
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Window::Rectangle => "rectangle",
            Window::Bartlett => "bartlett",
            Window::Welch => "welch",
            Window::Hanning => "hanning",
            Window::Hamming => "hamming",
            Window::Blackman => "blackman",
            Window::Cosine => "cosine",
            Window::Gaussian { .. } => "gaussian",
            Window::Tukey { .. } => "tukey",
            Window::Kaiser { .. } => "kaiser",
        }
    }

    /// Whether the window consumes a shape parameter.
    pub fn uses_parameter(&self) -> bool {
        self.parameter().is_some()
    }

    /// The shape parameter, if the window has one.
    pub fn parameter(&self) -> Option<f64> {
        match *self {
            Window::Gaussian { sigma } => Some(sigma),
            Window::Tukey { alpha } => Some(alpha),
            Window::Kaiser { beta } => Some(beta),
            _ => None,
        }
    }

    /// Checks the shape parameter's range.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Window::Gaussian { sigma } if !(sigma.is_finite() && sigma > 0.0) => Err(
                WaveformError::invalid_parameter("sigma", "must be finite and positive"),
            ),
            Window::Tukey { alpha } if !(0.0..=1.0).contains(&alpha) => Err(
                WaveformError::invalid_parameter("alpha", "must lie in [0, 1]"),
            ),
            Window::Kaiser { beta } if !(beta.is_finite() && beta >= 0.0) => Err(
                WaveformError::invalid_parameter("beta", "must be finite and non-negative"),
            ),
            _ => Ok(()),
        }
    }

    /// Evaluates the window shape at normalized position `t`.
    pub fn shape(&self, t: f64) -> f64 {
        match *self {
            Window::Rectangle => 1.0,
            Window::Bartlett => 1.0 - fabs(t),
            Window::Welch => 1.0 - t * t,
            Window::Hanning => 0.5 * (1.0 + cos(PI * t)),
            Window::Hamming => 0.54 + 0.46 * cos(PI * t),
            Window::Blackman => 0.42 + 0.5 * cos(PI * t) + 0.08 * cos(2.0 * PI * t),
            Window::Cosine => cos(0.5 * PI * t),
            Window::Gaussian { sigma } => {
                let u = t / sigma;
                exp(-0.5 * u * u)
            }
            Window::Tukey { alpha } => {
                let x = fabs(t);
                let flat = 1.0 - alpha;
                if alpha <= 0.0 || x <= flat {
                    1.0
                } else {
                    0.5 * (1.0 + cos(PI * (x - flat) / alpha))
                }
            }
            Window::Kaiser { beta } => {
                let arg = (1.0 - t * t).max(0.0);
                bessel_i0(beta * sqrt(arg)) / bessel_i0(beta)
            }
        }
    }

    /// Full symmetric window of `len` taps, optionally normalized to unit sum.
    ///
    /// # Example
    /// ```rust
    /// use wavetrace_core::Window;
    ///
    /// let w = Window::Hanning.weights(5, false).unwrap();
    /// assert!((w[2] - 1.0).abs() < 1e-12);
    /// assert!((w[0] - w[4]).abs() < 1e-12);
    /// ```
    pub fn weights(&self, len: usize, normalize: bool) -> Result<Vec<f64>> {
        self.validate()?;
        let denom = (len + 1) as f64;
        let mut weights: Vec<f64> = (0..len)
            .map(|n| {
                let t = (2.0 * n as f64 - (len as f64 - 1.0)) / denom;
                self.shape(t)
            })
            .collect();
        if normalize {
            let sum: f64 = weights.iter().sum();
            for w in &mut weights {
                *w /= sum;
            }
        }
        Ok(weights)
    }

    /// The `radius + 1` weights from the center of a `2 * radius + 1` window
    /// outward.
    ///
    /// When normalized, `w[0] + 2 * (w[1] + ... + w[radius]) == 1`.
    pub fn weights_single_sided(&self, radius: usize, normalize: bool) -> Result<Vec<f64>> {
        self.validate()?;
        let denom = (radius + 1) as f64;
        let mut weights: Vec<f64> = (0..=radius)
            .map(|k| self.shape(k as f64 / denom))
            .collect();
        if normalize {
            let sum = weights[0] + 2.0 * weights[1..].iter().sum::<f64>();
            for w in &mut weights {
                *w /= sum;
            }
        }
        Ok(weights)
    }
}

/// Modified Bessel function of the first kind, order zero.
fn bessel_i0(x: f64) -> f64 {
    let half = 0.5 * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    loop {
        term *= (half / k) * (half / k);
        sum += term;
        if term < sum * 1e-17 {
            break;
        }
        k += 1.0;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Window; 10] = [
        Window::Rectangle,
        Window::Bartlett,
        Window::Welch,
        Window::Hanning,
        Window::Hamming,
        Window::Blackman,
        Window::Cosine,
        Window::Gaussian { sigma: 0.5 },
        Window::Tukey { alpha: 0.5 },
        Window::Kaiser { beta: 4.0 },
    ];

    #[test]
    fn hanning_single_sided_radius_two() {
        let w = Window::Hanning.weights_single_sided(2, true).unwrap();
        assert!((w[0] - 1.0 / 3.0).abs() < 1e-15);
        assert!((w[1] - 0.25).abs() < 1e-15);
        assert!((w[2] - 1.0 / 12.0).abs() < 1e-15);
    }

    #[test]
    fn rectangle_single_sided_is_uniform() {
        let w = Window::Rectangle.weights_single_sided(2, true).unwrap();
        for &x in &w {
            assert!((x - 0.2).abs() < 1e-15);
        }
    }

    #[test]
    fn normalized_windows_sum_to_one() {
        for window in ALL {
            let full: f64 = window.weights(9, true).unwrap().iter().sum();
            assert!((full - 1.0).abs() < 1e-12, "{window:?}: {full}");

            let single = window.weights_single_sided(4, true).unwrap();
            let total = single[0] + 2.0 * single[1..].iter().sum::<f64>();
            assert!((total - 1.0).abs() < 1e-12, "{window:?}: {total}");
        }
    }

    #[test]
    fn single_sided_matches_full_window() {
        for window in ALL {
            let full = window.weights(7, false).unwrap();
            let single = window.weights_single_sided(3, false).unwrap();
            for k in 0..=3 {
                assert!((full[3 + k] - single[k]).abs() < 1e-12, "{window:?}");
                assert!((full[3 - k] - single[k]).abs() < 1e-12, "{window:?}");
            }
        }
    }

    #[test]
    fn windows_peak_at_center() {
        for window in ALL {
            let w = window.weights(11, false).unwrap();
            assert!((w[5] - 1.0).abs() < 1e-12, "{window:?}");
            assert!(w.iter().all(|&x| x > 0.0 && x <= 1.0 + 1e-12), "{window:?}");
        }
    }

    #[test]
    fn tukey_limits() {
        let rect = Window::Tukey { alpha: 0.0 }.weights(8, false).unwrap();
        assert!(rect.iter().all(|&x| x == 1.0));

        let hann = Window::Hanning.weights(8, false).unwrap();
        let tukey = Window::Tukey { alpha: 1.0 }.weights(8, false).unwrap();
        for (a, b) in hann.iter().zip(&tukey) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn kaiser_zero_beta_is_rectangular() {
        let w = Window::Kaiser { beta: 0.0 }.weights(6, false).unwrap();
        assert!(w.iter().all(|&x| (x - 1.0).abs() < 1e-15));
    }

    #[test]
    fn bessel_i0_reference_values() {
        assert_eq!(bessel_i0(0.0), 1.0);
        assert!((bessel_i0(1.0) - 1.2660658777520084).abs() < 1e-14);
        assert!((bessel_i0(5.0) - 27.239871823604442).abs() < 1e-11);
    }

    #[test]
    fn parameter_flags() {
        assert!(!Window::Hamming.uses_parameter());
        assert!(Window::Kaiser { beta: 2.0 }.uses_parameter());
        assert_eq!(Window::Tukey { alpha: 0.25 }.parameter(), Some(0.25));
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(Window::Gaussian { sigma: 0.0 }.weights(5, true).is_err());
        assert!(Window::Tukey { alpha: 1.5 }.weights(5, true).is_err());
        assert!(Window::Kaiser { beta: f64::NAN }.weights(5, true).is_err());
        assert!(Window::from_name("triangle", 0.0).is_err());
    }

    #[test]
    fn names_round_trip() {
        for window in ALL {
            let parsed = Window::from_name(window.name(), window.parameter().unwrap_or(0.0));
            assert_eq!(parsed.unwrap(), window);
        }
        assert_eq!(Window::NAMES.len(), ALL.len());
    }
}
