//! CLI command implementations.

pub mod common;
pub mod ops;
pub mod pipelines;
pub mod process;
pub mod stats;
