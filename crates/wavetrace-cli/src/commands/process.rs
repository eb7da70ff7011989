//! File-based record processing command.

use crate::commands::common::{abort_flag, param_map, parse_key_val};
use crate::records::{read_records, write_records};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use wavetrace_config::{Operation, Pipeline};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input record file (one record per line)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output record file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Pipeline: built-in name, file path, or name in the user pipelines directory
    #[arg(short, long, conflicts_with = "op")]
    pipeline: Option<String>,

    /// Single operation to apply
    #[arg(short, long)]
    op: Option<String>,

    /// Operation parameters (e.g., "radius=4")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1, requires = "op")]
    param: Vec<(String, String)>,

    /// Save the operation as a pipeline file before running it
    #[arg(long, value_name = "FILE", requires = "op")]
    save_pipeline: Option<PathBuf>,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let pipeline = if let Some(name) = &args.pipeline {
        let pipeline =
            Pipeline::find(name).with_context(|| format!("failed to load pipeline '{name}'"))?;
        tracing::info!(pipeline = %pipeline.name, operations = pipeline.len(), "loaded pipeline");
        pipeline
    } else if let Some(op_name) = &args.op {
        let op = Operation::from_params(op_name, &param_map(args.param))?;
        Pipeline::new(op_name.as_str()).with_operation(op)
    } else {
        anyhow::bail!("No operation specified. Use --op or --pipeline");
    };

    if let Some(path) = &args.save_pipeline {
        pipeline.save(path)?;
        tracing::info!(path = %path.display(), "saved pipeline");
    }

    let mut records = read_records(&args.input)?;
    let record_length = records.record_length;
    tracing::info!(
        input = %args.input.display(),
        records = records.num_records(),
        record_length,
        "read records"
    );

    pipeline.validate(record_length)?;

    let abort = abort_flag()?;
    let pb = ProgressBar::new(pipeline.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    for op in pipeline.iter() {
        pb.set_message(op.name());
        tracing::info!(op = op.name(), "running");
        op.apply_with_abort(&mut records.data, record_length, || {
            abort.load(Ordering::SeqCst)
        })
        .with_context(|| format!("operation '{}' failed", op.name()))?;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    write_records(&args.output, &records.data, record_length)?;
    tracing::info!(output = %args.output.display(), "wrote records");

    Ok(())
}
