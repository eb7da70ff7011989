//! Pipeline validation.
//!
//! Every operation of a pipeline is checked against the record length before
//! any of them runs, and all problems are reported together.
//!
//! # Example
//!
//! ```rust
//! use wavetrace_config::{Operation, Pipeline, validate_pipeline};
//!
//! let pipeline = Pipeline::new("smooth").with_operation(Operation::MovingMedian { radius: 2 });
//! assert!(validate_pipeline(&pipeline, 16).is_ok());
//! assert!(validate_pipeline(&pipeline, 4).is_err());
//! ```

use thiserror::Error;
use wavetrace_core::WaveformError;

use crate::pipeline::Pipeline;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The pipeline names a record length that differs from the data.
    #[error("pipeline expects records of {expected} samples, got {actual}")]
    RecordLengthMismatch {
        /// Record length stored in the pipeline.
        expected: usize,
        /// Record length of the data.
        actual: usize,
    },

    /// One operation rejected the record length or its own parameters.
    #[error("operation {index} ({op}): {source}")]
    Operation {
        /// Position of the operation in the pipeline.
        index: usize,
        /// Operation name.
        op: &'static str,
        /// What the operation rejected.
        #[source]
        source: WaveformError,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks every operation of `pipeline` against `record_length`.
pub fn validate_pipeline(pipeline: &Pipeline, record_length: usize) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Some(expected) = pipeline.record_length
        && expected != record_length
    {
        errors.push(ValidationError::RecordLengthMismatch {
            expected,
            actual: record_length,
        });
    }

    for (index, op) in pipeline.operations.iter().enumerate() {
        if let Err(source) = op.validate(record_length) {
            errors.push(ValidationError::Operation {
                index,
                op: op.name(),
                source,
            });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
