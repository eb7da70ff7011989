//! Pipelines bundled with the library.
//!
//! These are always available by name, without a file on disk, and double as
//! starting points for custom pipelines.

use crate::Pipeline;

/// TOML content for built-in pipelines, keyed by name.
static BUILTIN_PIPELINES_TOML: &[(&str, &str)] = &[
    ("echo_envelope", ECHO_ENVELOPE),
    ("detrend_smooth", DETREND_SMOOTH),
    ("declip", DECLIP),
    ("despike", DESPIKE),
];

/// Log-compressed envelope of pulse-echo records.
const ECHO_ENVELOPE: &str = r#"
name = "echo_envelope"
description = "Remove the DC offset, take the analytic envelope, convert to dB"

[[operations]]
op = "subtract_baseline"
baseline = "mean"

[[operations]]
op = "envelope"
subtract_mean = false

[[operations]]
op = "log10"
scale = 20.0
"#;

/// Detrend, then light binomial smoothing.
const DETREND_SMOOTH: &str = r#"
name = "detrend_smooth"
description = "Remove a linear trend and apply two binomial passes"

[[operations]]
op = "subtract_baseline"
baseline = "linear_fit"

[[operations]]
op = "binomial_filter"
passes = 2
"#;

/// Spline repair of clipped samples in normalized data.
const DECLIP: &str = r#"
name = "declip"
description = "Rebuild samples at or beyond full scale from a cubic spline"

[[operations]]
op = "repair_clipped"
threshold = 0.999
"#;

/// Median-based spike suppression.
const DESPIKE: &str = r#"
name = "despike"
description = "Moving median over five samples, then remove the median baseline"

[[operations]]
op = "moving_median"
radius = 2

[[operations]]
op = "subtract_baseline"
baseline = "median"
"#;

/// All built-in pipelines.
pub fn builtin_pipelines() -> Vec<Pipeline> {
    BUILTIN_PIPELINES_TOML
        .iter()
        .filter_map(|(_, toml)| Pipeline::from_toml(toml).ok())
        .collect()
}

/// Get a built-in pipeline by name (case-insensitive).
///
/// # Example
///
/// ```rust
/// use wavetrace_config::get_builtin_pipeline;
///
/// let pipeline = get_builtin_pipeline("Echo_Envelope").unwrap();
/// assert_eq!(pipeline.operation_names(), vec!["subtract_baseline", "envelope", "log10"]);
/// assert!(get_builtin_pipeline("my_pipeline").is_none());
/// ```
pub fn get_builtin_pipeline(name: &str) -> Option<Pipeline> {
    BUILTIN_PIPELINES_TOML
        .iter()
        .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| Pipeline::from_toml(toml).ok())
}

/// Names of all built-in pipelines.
pub fn builtin_pipeline_names() -> Vec<&'static str> {
    BUILTIN_PIPELINES_TOML.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_builtins_parse() {
        for (name, toml) in BUILTIN_PIPELINES_TOML {
            let pipeline = Pipeline::from_toml(toml)
                .unwrap_or_else(|e| panic!("built-in '{name}' failed to parse: {e}"));
            assert_eq!(pipeline.name, *name);
            assert!(pipeline.description.is_some());
            assert!(!pipeline.is_empty());
        }
        assert_eq!(builtin_pipelines().len(), BUILTIN_PIPELINES_TOML.len());
    }

    #[test]
    fn all_builtins_validate() {
        for pipeline in builtin_pipelines() {
            pipeline
                .validate(64)
                .unwrap_or_else(|e| panic!("'{}': {e}", pipeline.name));
        }
    }

    #[test]
    fn names_are_listed() {
        let names = builtin_pipeline_names();
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"declip"));
    }

    #[test]
    fn echo_envelope_on_a_tone() {
        let pipeline = get_builtin_pipeline("echo_envelope").unwrap();
        let mut data: Vec<f64> = (0..64)
            .map(|n| 0.5 + (std::f64::consts::TAU * 4.0 * f64::from(n) / 64.0).cos())
            .collect();
        pipeline.apply(&mut data, 64).unwrap();
        // Unit-amplitude tone: flat envelope at 0 dB.
        assert!(data.iter().all(|db| db.abs() < 1e-9), "{data:?}");
    }
}
