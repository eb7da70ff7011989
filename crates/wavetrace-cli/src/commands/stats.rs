//! Per-record statistics command.

use crate::commands::common::{param_map, parse_key_val};
use crate::records::{format_rows, read_records};
use clap::Args;
use std::path::PathBuf;
use wavetrace_config::Statistic;

#[derive(Args)]
pub struct StatsArgs {
    /// Input record file (one record per line)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Statistic to compute (see `wavetrace ops`)
    #[arg(short, long)]
    stat: String,

    /// Statistic parameters (e.g., "delta_t=1us")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Write results to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit JSON instead of one row per line
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs) -> anyhow::Result<()> {
    let stat = Statistic::from_params(&args.stat, &param_map(args.param))?;
    let records = read_records(&args.input)?;
    tracing::info!(
        input = %args.input.display(),
        records = records.num_records(),
        record_length = records.record_length,
        stat = stat.name(),
        "computing statistic"
    );

    let rows = stat.compute(&records.data, records.record_length)?;

    let text = if args.json {
        let report = serde_json::json!({
            "statistic": stat.name(),
            "records": records.num_records(),
            "record_length": records.record_length,
            "per_record": stat.per_record(),
            "values": rows,
        });
        serde_json::to_string_pretty(&report)? + "\n"
    } else {
        format_rows(rows.iter().map(Vec::as_slice))
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(output = %path.display(), "wrote statistic");
        }
        None => print!("{text}"),
    }

    Ok(())
}
