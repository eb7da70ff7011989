//! Wavetrace CLI - Command-line interface for record-oriented waveform processing.

mod commands;
mod records;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wavetrace")]
#[command(author, version, about = "Wavetrace waveform record processing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run operations or a pipeline over every record of a file
    Process(commands::process::ProcessArgs),

    /// Compute a per-record statistic
    Stats(commands::stats::StatsArgs),

    /// List available operations and statistics
    Ops(commands::ops::OpsArgs),

    /// List and show pipelines
    Pipelines(commands::pipelines::PipelinesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Ops(args) => commands::ops::run(args),
        Commands::Pipelines(args) => commands::pipelines::run(args),
    }
}
