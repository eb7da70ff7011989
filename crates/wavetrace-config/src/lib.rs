//! Pipeline configuration for wavetrace waveform operations.
//!
//! Every in-place kernel of `wavetrace-core` and `wavetrace-analysis` is
//! available as an [`Operation`] value with explicit parameters, and every
//! per-record reduction as a [`Statistic`]. Operations chain into a
//! [`Pipeline`] that loads from and saves to TOML.
//!
//! # Features
//!
//! - **Pipelines**: Load and save operation sequences from TOML files
//! - **Name lookup**: Build operations and statistics from `key=value` parameters
//! - **Validation**: Check a whole pipeline against a record length before it runs
//! - **Built-ins**: Bundled pipelines for common pulse-echo preprocessing
//!
//! # Example
//!
//! ```rust
//! use wavetrace_config::{Operation, Pipeline, Statistic};
//! use wavetrace_core::Baseline;
//!
//! let pipeline = Pipeline::new("detrend")
//!     .with_operation(Operation::SubtractBaseline { baseline: Baseline::Median })
//!     .with_operation(Operation::BinomialFilter { passes: 1 });
//!
//! let mut data = vec![1.0, 3.0, 2.0, 4.0, 5.0, 7.0, 6.0, 8.0];
//! pipeline.apply(&mut data, 4).unwrap();
//!
//! let peaks = Statistic::Max.compute(&data, 4).unwrap();
//! assert_eq!(peaks.len(), 2);
//! ```

mod builtin;
mod error;
mod operation;
mod params;
mod pipeline;
mod statistic;

/// Platform-specific paths for pipeline files.
pub mod paths;

/// Pipeline validation.
pub mod validation;

pub use builtin::{builtin_pipeline_names, builtin_pipelines, get_builtin_pipeline};
pub use error::ConfigError;
pub use operation::{Operation, Reference};
pub use params::{ParamReader, parse_param_value, parse_params};
pub use pipeline::Pipeline;
pub use statistic::Statistic;
pub use validation::{ValidationError, ValidationResult, validate_pipeline};
