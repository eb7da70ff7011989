//! Pipeline file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::builtin::get_builtin_pipeline;
use crate::error::ConfigError;
use crate::operation::Operation;
use crate::paths::find_pipeline;
use crate::validation::{ValidationResult, validate_pipeline};

/// A named sequence of in-place operations.
///
/// Pipelines are stored as TOML files. They can be loaded from files,
/// created programmatically, and saved to disk.
///
/// # TOML Format
///
/// ```toml
/// name = "ultrasound envelope"
/// description = "Detrend, then log-compressed envelope"
/// record_length = 1024
///
/// [[operations]]
/// op = "subtract_baseline"
/// baseline = "mean"
///
/// [[operations]]
/// op = "envelope"
/// subtract_mean = false
///
/// [[operations]]
/// op = "log10"
/// scale = 20.0
/// ```
///
/// `record_length` is optional; when present, data with another record
/// length is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pipeline {
    /// Name of the pipeline.
    pub name: String,

    /// Optional description of the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Record length the pipeline was written for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_length: Option<usize>,

    /// Operations, applied in order.
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            record_length: None,
            operations: Vec::new(),
        }
    }

    /// Create a pipeline with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Pin the record length.
    pub fn with_record_length(mut self, record_length: usize) -> Self {
        self.record_length = Some(record_length);
        self
    }

    /// Append an operation.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Load a pipeline from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Resolve a pipeline by built-in name, file path, or name in the user directory.
    pub fn find(name: &str) -> Result<Self, ConfigError> {
        if let Some(pipeline) = get_builtin_pipeline(name) {
            return Ok(pipeline);
        }
        match find_pipeline(name) {
            Some(path) => Self::load(path),
            None => Err(ConfigError::PipelineNotFound(name.to_string())),
        }
    }

    /// Load a pipeline from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the pipeline to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the pipeline to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterate over operations.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    /// Operation names in order.
    pub fn operation_names(&self) -> Vec<&'static str> {
        self.operations.iter().map(Operation::name).collect()
    }

    /// Check every operation against `record_length`.
    pub fn validate(&self, record_length: usize) -> ValidationResult<()> {
        validate_pipeline(self, record_length)
    }

    /// Validate, then run every operation on `buffer`.
    ///
    /// Validation failures leave the buffer untouched. An error raised by a
    /// later operation leaves the output of the earlier ones in place.
    ///
    /// # Example
    /// ```rust
    /// use wavetrace_config::Pipeline;
    ///
    /// let pipeline = Pipeline::from_toml(r#"
    ///     name = "detrend"
    ///     [[operations]]
    ///     op = "subtract_baseline"
    ///     baseline = "mean"
    /// "#).unwrap();
    ///
    /// let mut data = vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0];
    /// pipeline.apply(&mut data, 3).unwrap();
    /// assert_eq!(data, vec![-1.0, 0.0, 1.0, -10.0, 0.0, 10.0]);
    /// ```
    pub fn apply(&self, buffer: &mut [f64], record_length: usize) -> Result<(), ConfigError> {
        self.apply_with_abort(buffer, record_length, || false)
    }

    /// Like [`apply`](Self::apply), polling `abort` between records.
    pub fn apply_with_abort(
        &self,
        buffer: &mut [f64],
        record_length: usize,
        mut abort: impl FnMut() -> bool,
    ) -> Result<(), ConfigError> {
        self.validate(record_length)?;
        for op in &self.operations {
            #[cfg(feature = "tracing")]
            tracing::debug!("pipeline '{}': {}", self.name, op.name());
            op.apply_with_abort(buffer, record_length, &mut abort)?;
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
