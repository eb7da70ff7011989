//! `key=value` parameters for building operations and statistics by name.
//!
//! Values are strings so a command line can pass them through unchanged;
//! [`ParamReader`] converts them on demand and reports keys nobody asked for.

use std::collections::{BTreeSet, HashMap};

use wavetrace_core::Window;

use crate::error::ConfigError;

/// Parse a parameter value string into an f64.
///
/// Supports:
/// - Plain numbers: "0.5", "1e-6", "-3"
/// - Time: "20ns", "1.5us" (or "µs"), "2ms", "0.1s" (converted to seconds)
/// - Frequency: "440Hz", "2.5kHz", "5MHz", "1GHz" (converted to Hz)
///
/// # Example
/// ```rust
/// use wavetrace_config::parse_param_value;
///
/// assert_eq!(parse_param_value("0.25"), Some(0.25));
/// assert_eq!(parse_param_value("5MHz"), Some(5.0e6));
/// assert!((parse_param_value("2us").unwrap() - 2.0e-6).abs() < 1e-18);
/// assert_eq!(parse_param_value("fast"), None);
/// ```
pub fn parse_param_value(value: &str) -> Option<f64> {
    const UNITS: &[(&str, f64)] = &[
        ("GHz", 1e9),
        ("MHz", 1e6),
        ("kHz", 1e3),
        ("Hz", 1.0),
        ("ns", 1e-9),
        ("us", 1e-6),
        ("µs", 1e-6),
        ("ms", 1e-3),
        ("s", 1.0),
    ];

    let value = value.trim();
    for &(suffix, scale) in UNITS {
        if let Some(number) = value.strip_suffix(suffix) {
            return number.trim().parse::<f64>().ok().map(|v| v * scale);
        }
    }
    value.parse::<f64>().ok()
}

/// Split `key=value` arguments into a map.
///
/// Keys are trimmed and lowercased; a later duplicate overrides an earlier one.
pub fn parse_params<S: AsRef<str>>(
    op: &str,
    args: &[S],
) -> Result<HashMap<String, String>, ConfigError> {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                ConfigError::invalid_parameter(op, arg, "expected key=value")
            })?;
            Ok((key.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Typed, tracked access to a parameter map.
pub struct ParamReader<'a> {
    op: &'a str,
    params: &'a HashMap<String, String>,
    used: BTreeSet<&'a str>,
}

impl<'a> ParamReader<'a> {
    /// Wrap `params` for the operation or statistic `op`.
    pub fn new(op: &'a str, params: &'a HashMap<String, String>) -> Self {
        Self {
            op,
            params,
            used: BTreeSet::new(),
        }
    }

    fn raw(&mut self, key: &'a str) -> Option<&'a str> {
        self.used.insert(key);
        self.params.get(key).map(String::as_str)
    }

    fn error(&self, key: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::invalid_parameter(self.op, key, reason)
    }

    /// Optional float, accepting the units of [`parse_param_value`].
    pub fn f64_or(&mut self, key: &'a str, default: f64) -> Result<f64, ConfigError> {
        self.raw(key).map_or(Ok(default), |v| {
            parse_param_value(v).ok_or_else(|| self.error(key, format!("'{v}' is not a number")))
        })
    }

    /// Required float.
    pub fn f64(&mut self, key: &'a str) -> Result<f64, ConfigError> {
        let v = self.raw(key).ok_or_else(|| self.error(key, "missing"))?;
        parse_param_value(v).ok_or_else(|| self.error(key, format!("'{v}' is not a number")))
    }

    /// Optional unsigned integer.
    pub fn usize_or(&mut self, key: &'a str, default: usize) -> Result<usize, ConfigError> {
        self.raw(key).map_or(Ok(default), |v| {
            v.parse()
                .map_err(|_| self.error(key, format!("'{v}' is not a non-negative integer")))
        })
    }

    /// Required unsigned integer.
    pub fn usize(&mut self, key: &'a str) -> Result<usize, ConfigError> {
        let v = self.raw(key).ok_or_else(|| self.error(key, "missing"))?;
        v.parse()
            .map_err(|_| self.error(key, format!("'{v}' is not a non-negative integer")))
    }

    /// Optional boolean: `true/false`, `yes/no`, `on/off`, `1/0`.
    pub fn bool_or(&mut self, key: &'a str, default: bool) -> Result<bool, ConfigError> {
        match self.raw(key).map(str::to_ascii_lowercase).as_deref() {
            None => Ok(default),
            Some("true" | "yes" | "on" | "1") => Ok(true),
            Some("false" | "no" | "off" | "0") => Ok(false),
            Some(other) => Err(self.error(key, format!("'{other}' is not a boolean"))),
        }
    }

    /// Optional string.
    pub fn str(&mut self, key: &'a str) -> Option<&'a str> {
        self.raw(key)
    }

    /// Window from `window` and its shape parameter `window_param`.
    pub fn window_or(&mut self, default: Window) -> Result<Window, ConfigError> {
        let parameter = self.f64_or("window_param", default.parameter().unwrap_or(0.0))?;
        match self.raw("window") {
            None => Ok(default),
            Some(name) => {
                Window::from_name(name, parameter).map_err(|e| self.error("window", e.to_string()))
            }
        }
    }

    /// Rejects parameters that no accessor consumed.
    pub fn finish(self) -> Result<(), ConfigError> {
        let mut unknown: Vec<&str> = self
            .params
            .keys()
            .map(String::as_str)
            .filter(|k| !self.used.contains(k))
            .collect();
        unknown.sort_unstable();
        match unknown.first() {
            None => Ok(()),
            Some(key) => Err(self.error(key, "unknown parameter")),
        }
    }
}
