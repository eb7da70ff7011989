//! Shared CLI helpers used across multiple commands.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .ok_or_else(|| format!("Invalid parameter format: '{s}' (expected key=value)"))
}

/// Collects `--param` pairs; later keys override earlier ones.
pub fn param_map(params: Vec<(String, String)>) -> HashMap<String, String> {
    params.into_iter().collect()
}

/// Installs a Ctrl+C handler that raises the returned flag.
///
/// The first Ctrl+C requests an abort between records; the process keeps
/// running so the abort surfaces as an ordinary error.
pub fn abort_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        tracing::warn!("abort requested, stopping after the current record");
        handler_flag.store(true, Ordering::SeqCst);
    })?;
    Ok(flag)
}
