//! Integration tests for wavetrace-cli.
//!
//! Tests cover the CLI binary invocation and end-to-end processing of text
//! record files.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the `wavetrace` binary built by cargo.
fn wavetrace_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wavetrace"))
}

fn run(args: &[&str]) -> Output {
    wavetrace_bin()
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run wavetrace")
}

fn read_rows(path: &Path) -> Vec<Vec<f64>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| {
            line.split_whitespace()
                .map(|v| v.parse().unwrap())
                .collect()
        })
        .collect()
}

fn write_input(dir: &TempDir, text: &str) -> String {
    let path = dir.path().join("input.txt");
    std::fs::write(&path, text).unwrap();
    path.to_string_lossy().to_string()
}

// ---------------------------------------------------------------------------
// Help and listings
// ---------------------------------------------------------------------------

#[test]
fn cli_help_works() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wavetrace waveform record processing CLI"));
    for command in ["process", "stats", "ops", "pipelines"] {
        assert!(stdout.contains(command), "help should list '{command}'");
    }
}

#[test]
fn cli_version_works() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("wavetrace"));
}

#[test]
fn cli_ops_lists_operations_and_statistics() {
    let output = run(&["ops", "--examples"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in [
        "subtract_baseline",
        "moving_median",
        "band_limited_power",
        "band_limited_power_physical",
        "align",
        "envelope",
        "kurtosis",
        "spectral_maximum",
        "Examples:",
    ] {
        assert!(stdout.contains(name), "ops listing should contain '{name}'");
    }
}

#[test]
fn cli_pipelines_show_builtin() {
    let output = run(&["pipelines", "show", "echo_envelope"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("op = \"envelope\""), "{stdout}");

    let output = run(&["pipelines", "list"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("despike"));
}

// ---------------------------------------------------------------------------
// process
// ---------------------------------------------------------------------------

#[test]
fn cli_process_single_operation() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "1 2 3 4\n10, 20, 30, 40\n");
    let output_path = dir.path().join("out.txt");

    let output = run(&[
        "process",
        &input,
        output_path.to_str().unwrap(),
        "--op",
        "subtract_baseline",
        "--param",
        "baseline=mean",
    ]);
    assert!(
        output.status.success(),
        "process failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        read_rows(&output_path),
        vec![vec![-1.5, -0.5, 0.5, 1.5], vec![-15.0, -5.0, 5.0, 15.0]]
    );
}

#[test]
fn cli_process_pipeline_file_and_save() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "0 0 9 0 0 1 2\n");
    let saved = dir.path().join("median.toml");
    let first = dir.path().join("first.txt");

    let output = run(&[
        "process",
        &input,
        first.to_str().unwrap(),
        "--op",
        "moving_median",
        "--param",
        "radius=1",
        "--save-pipeline",
        saved.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read_rows(&first), vec![vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0]]);

    // Running the saved pipeline reproduces the result.
    let second = dir.path().join("second.txt");
    let output = run(&[
        "process",
        &input,
        second.to_str().unwrap(),
        "--pipeline",
        saved.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read_rows(&second), read_rows(&first));
}

#[test]
fn cli_process_builtin_pipeline() {
    let dir = TempDir::new().unwrap();
    let record: Vec<String> = (0..32)
        .map(|n| format!("{}", 1.0 + (std::f64::consts::TAU * 4.0 * f64::from(n) / 32.0).cos()))
        .collect();
    let input = write_input(&dir, &format!("{}\n", record.join(" ")));
    let output_path = dir.path().join("out.txt");

    let output = run(&[
        "process",
        &input,
        output_path.to_str().unwrap(),
        "--pipeline",
        "echo_envelope",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let rows = read_rows(&output_path);
    assert_eq!(rows[0].len(), 32);
    assert!(rows[0].iter().all(|db| db.abs() < 1e-6), "{rows:?}");
}

#[test]
fn cli_process_rejects_bad_input() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let out = out.to_str().unwrap();

    let ragged = write_input(&dir, "1 2 3\n4 5\n");
    let output = run(&["process", &ragged, out, "--op", "log10"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("expected 3"));

    let good = write_input(&dir, "1 2 3\n");
    let output = run(&["process", &good, out, "--op", "fourier"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown operation"));

    let output = run(&["process", &good, out, "--op", "moving_median", "--param", "radius=5"]);
    assert!(!output.status.success());

    let output = run(&["process", &good, out]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No operation specified"));
    assert!(!Path::new(out).exists());
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[test]
fn cli_stats_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "1 2 3 4\n5 6 7 8\n");

    let output = run(&["stats", &input, "--stat", "mean"]);
    assert!(output.status.success());
    let values: Vec<f64> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim().parse().unwrap())
        .collect();
    assert_eq!(values, vec![2.5, 6.5]);
}

#[test]
fn cli_stats_json_and_file_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "1 2 3 4\n5 6 7 8\n");
    let json_path = dir.path().join("avg.json");

    let output = run(&[
        "stats",
        &input,
        "--stat",
        "average_record",
        "--json",
        "--output",
        json_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = std::fs::read_to_string(&json_path).unwrap();
    let report: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(report["statistic"], "average_record");
    assert_eq!(report["records"], 2);
    assert_eq!(report["per_record"], false);
    assert_eq!(report["values"][0][1], 4.0);
}

#[test]
fn cli_stats_unknown_statistic_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "1 2 3\n");
    let output = run(&["stats", &input, "--stat", "mode"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown statistic"));
}
