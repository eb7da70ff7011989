//! Wavetrace Core - record-oriented waveform kernels
//!
//! A waveform buffer is a flat slice holding `num_records` records of
//! `record_length` samples each, back to back: sample `j` of record `i` is
//! `buffer[i * record_length + j]`. Every kernel in this crate works on that
//! layout, for `f32` and `f64` samples alike (see [`Sample`]).
//!
//! # Building Blocks
//!
//! - [`RecordLayout`] - Validated view of a buffer as fixed-length records
//! - [`Window`] - Tapering windows, full or single-sided
//! - [`SplineCoefficients`] - Natural cubic splines and Reinsch smoothing
//!
//! # Operations
//!
//! ## In place
//!
//! - [`sliding`] - Moving-window average, power, variance, median, range,
//!   zero-crossing count (mirrored boundaries)
//! - [`band_limited_power`] - Moving-window DFT power over a bin range
//! - [`repair_clipped`] / [`smooth_with_spline`] - Spline repair and smoothing
//! - [`subtract_baseline`], [`combine`], [`binomial_filter`] - Record arithmetic
//!
//! ## Per record
//!
//! - [`reducers`] - Mean, median, extrema, moments, crossing counts
//! - [`zero_crossing_locations`] - Sub-sample crossing positions
//!
//! # Errors
//!
//! Every operation validates its layout and parameters before writing, so an
//! `Err` leaves the buffer as it was. The one exception is
//! [`WaveformError::Aborted`].
//!
//! # no_std Support
//!
//! The crate needs only `alloc`. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! wavetrace-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use wavetrace_core::{Baseline, Window, reducers, sliding, subtract_baseline};
//!
//! let mut data = vec![1.0f32, 4.0, 2.0, 8.0, 5.0, 7.0, 3.0, 3.0];
//! subtract_baseline(&mut data, 4, Baseline::Mean).unwrap();
//! sliding::weighted_average(&mut data, 4, 1, Window::Hanning).unwrap();
//! let peaks = reducers::max(&data, 4).unwrap();
//! assert_eq!(peaks.len(), 2);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod arithmetic;
pub mod band_power;
pub mod clip;
pub mod crossings;
pub mod error;
pub mod records;
pub mod reducers;
pub mod sample;
pub mod sliding;
pub mod spline;
pub mod window;

// Re-export main types at crate root
pub use arithmetic::{Baseline, CombineOp, binomial_filter, combine, subtract_baseline};
pub use band_power::{BandLimitedPower, band_limited_power};
pub use clip::{repair_clipped, smooth_with_spline};
pub use crossings::{Interpolation, ZeroCrossing, zero_crossing_locations};
pub use error::{Result, WaveformError};
pub use records::{RecordLayout, mirror_index, reduce_records, transform_records};
pub use reducers::RunningMoments;
pub use sample::Sample;
pub use spline::{MIN_SPLINE_KNOTS, SplineCoefficients, natural_cubic_spline, smoothing_spline};
pub use window::Window;
