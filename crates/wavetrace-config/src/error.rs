//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;
use wavetrace_core::WaveformError;

use crate::validation::ValidationError;

/// Errors that can occur while loading, validating, or running pipelines.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Neither a built-in pipeline nor a pipeline file matched the name.
    #[error("pipeline not found: {0}")]
    PipelineNotFound(String),

    /// Unknown operation name
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Unknown statistic name
    #[error("unknown statistic: {0}")]
    UnknownStatistic(String),

    /// Invalid parameter
    #[error("invalid parameter '{param}' for '{op}': {reason}")]
    InvalidParameter {
        /// Operation or statistic the parameter belongs to.
        op: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A waveform kernel rejected its input or was aborted.
    #[error(transparent)]
    Waveform(#[from] WaveformError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(
        op: impl Into<String>,
        param: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidParameter {
            op: op.into(),
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error reports a cooperative abort.
    pub fn is_aborted(&self) -> bool {
        matches!(self, ConfigError::Waveform(WaveformError::Aborted { .. }))
    }
}
