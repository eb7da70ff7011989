//! Text record files: one record per line.
//!
//! Values are separated by whitespace, commas, or both. Blank lines and lines
//! starting with `#` are skipped. Every record must have the same length.

use anyhow::{Context, bail};
use std::fmt::Write as _;
use std::path::Path;

/// Records read from a file, flattened.
#[derive(Debug)]
pub struct RecordFile {
    /// Samples, record after record.
    pub data: Vec<f64>,
    /// Samples per record.
    pub record_length: usize,
}

impl RecordFile {
    /// Number of records.
    pub fn num_records(&self) -> usize {
        self.data.len() / self.record_length
    }
}

/// Parses record text.
pub fn parse_records(text: &str) -> anyhow::Result<RecordFile> {
    let mut data = Vec::new();
    let mut record_length = None;

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let start = data.len();
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let value: f64 = token
                .parse()
                .with_context(|| format!("line {}: '{token}' is not a number", index + 1))?;
            data.push(value);
        }
        let len = data.len() - start;
        match record_length {
            None => record_length = Some(len),
            Some(expected) if expected != len => bail!(
                "line {}: record has {len} values, expected {expected}",
                index + 1
            ),
            Some(_) => {}
        }
    }

    match record_length {
        Some(record_length) if record_length > 0 => Ok(RecordFile {
            data,
            record_length,
        }),
        _ => bail!("no records found"),
    }
}

/// Reads a record file.
pub fn read_records(path: &Path) -> anyhow::Result<RecordFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_records(&text).with_context(|| format!("invalid record file {}", path.display()))
}

/// Formats rows, one per line, values separated by single spaces.
pub fn format_rows<'a>(rows: impl IntoIterator<Item = &'a [f64]>) -> String {
    let mut out = String::new();
    for row in rows {
        for (i, v) in row.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{v}");
        }
        out.push('\n');
    }
    out
}

/// Writes `data` as records of `record_length` samples.
pub fn write_records(path: &Path, data: &[f64], record_length: usize) -> anyhow::Result<()> {
    std::fs::write(path, format_rows(data.chunks(record_length)))
        .with_context(|| format!("failed to write {}", path.display()))
}
