//! Error type shared by every waveform kernel.
//!
//! Shape and parameter violations are reported before any sample is touched,
//! so an in-place operation that returns `Err` leaves its buffer unchanged.
//! The one exception is [`WaveformError::Aborted`], which reports how many
//! records were already written when a cooperative abort was observed.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use thiserror::Error;

/// Errors reported by waveform kernels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaveformError {
    /// The record length was zero.
    #[error("record length must be greater than zero")]
    ZeroRecordLength,

    /// The buffer held no samples.
    #[error("buffer is empty")]
    EmptyBuffer,

    /// The buffer length is not a whole number of records.
    #[error("buffer length {len} is not a multiple of record length {record_length}")]
    RaggedBuffer {
        /// Number of samples in the buffer.
        len: usize,
        /// Requested record length.
        record_length: usize,
    },

    /// Records are too short for the requested operation.
    #[error("{operation} requires records of at least {min} samples, got {record_length}")]
    RecordTooShort {
        /// Operation that rejected the layout.
        operation: &'static str,
        /// Requested record length.
        record_length: usize,
        /// Smallest record length the operation accepts.
        min: usize,
    },

    /// A moving window of `2 * radius + 1` samples does not fit in a record.
    #[error("window radius {radius} does not fit in records of {record_length} samples")]
    RadiusTooLarge {
        /// Requested window radius.
        radius: usize,
        /// Requested record length.
        record_length: usize,
    },

    /// A scalar parameter was out of range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An auxiliary input (seed, reference, knot vector) has the wrong length.
    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        /// Which input was mismatched.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A transform length was not a power of two.
    #[error("transform length {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// The caller requested an abort between records.
    #[error("aborted after {completed} records")]
    Aborted {
        /// Number of records fully written before the abort.
        completed: usize,
    },
}

impl WaveformError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        WaveformError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for waveform kernels.
pub type Result<T> = core::result::Result<T, WaveformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_buffer_display() {
        let err = WaveformError::RaggedBuffer {
            len: 16,
            record_length: 5,
        };
        assert_eq!(
            err.to_string(),
            "buffer length 16 is not a multiple of record length 5"
        );
    }

    #[test]
    fn record_too_short_display() {
        let err = WaveformError::RecordTooShort {
            operation: "binomial filter",
            record_length: 2,
            min: 3,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("binomial filter"), "got: {msg}");
        assert!(msg.contains("at least 3"), "got: {msg}");
    }

    #[test]
    fn invalid_parameter_factory() {
        let err = WaveformError::invalid_parameter("threshold", "must be finite");
        assert_eq!(
            err,
            WaveformError::InvalidParameter {
                name: "threshold",
                reason: "must be finite".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid parameter 'threshold': must be finite"
        );
    }

    #[test]
    fn aborted_display() {
        let err = WaveformError::Aborted { completed: 3 };
        assert_eq!(err.to_string(), "aborted after 3 records");
    }
}
