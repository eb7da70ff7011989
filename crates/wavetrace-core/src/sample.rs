//! Sample precision abstraction.
//!
//! Every kernel in this crate accepts record buffers of either `f32` or `f64`.
//! Arithmetic always runs in `f64`; results are narrowed back to the buffer's
//! precision on write-back.

use core::fmt::Debug;

/// A floating-point sample type that can hold waveform data.
///
/// Implemented for `f32` and `f64`.
pub trait Sample: Copy + PartialOrd + Default + Debug + Send + Sync + 'static {
    /// Widens the sample to `f64` for computation.
    fn to_f64(self) -> f64;

    /// Narrows an `f64` result back to the sample type.
    fn from_f64(value: f64) -> Self;
}

impl Sample for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}
