//! Pipeline listing commands.

use clap::{Args, Subcommand};
use wavetrace_config::paths::{list_user_pipelines, pipeline_name_from_path, user_pipelines_dir};
use wavetrace_config::{Pipeline, builtin_pipelines};

#[derive(Args)]
pub struct PipelinesArgs {
    #[command(subcommand)]
    command: PipelinesCommand,
}

#[derive(Subcommand)]
enum PipelinesCommand {
    /// List built-in and user pipelines
    List,

    /// Print a pipeline as TOML
    Show {
        /// Pipeline name or path
        name: String,
    },
}

pub fn run(args: PipelinesArgs) -> anyhow::Result<()> {
    match args.command {
        PipelinesCommand::List => {
            println!("Built-in pipelines:");
            for pipeline in builtin_pipelines() {
                println!(
                    "  {:16}  {}",
                    pipeline.name,
                    pipeline.description.as_deref().unwrap_or("")
                );
            }

            println!();
            println!("User pipelines ({}):", user_pipelines_dir().display());
            let user = list_user_pipelines();
            if user.is_empty() {
                println!("  (none)");
            }
            for path in user {
                match Pipeline::load(&path) {
                    Ok(pipeline) => {
                        let steps = pipeline.operation_names().join(" -> ");
                        let name = pipeline_name_from_path(&path).unwrap_or(pipeline.name);
                        println!("  {name:16}  {steps}");
                    }
                    Err(e) => tracing::warn!(path = %path.display(), "skipping: {e}"),
                }
            }
        }
        PipelinesCommand::Show { name } => {
            let pipeline = Pipeline::find(&name)?;
            print!("{}", pipeline.to_toml()?);
        }
    }
    Ok(())
}
