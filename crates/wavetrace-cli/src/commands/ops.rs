//! Operation and statistic listing command.

use clap::Args;
use wavetrace_config::{Operation, Statistic};

#[derive(Args)]
pub struct OpsArgs {
    /// Show example commands
    #[arg(long)]
    examples: bool,
}

pub fn run(args: OpsArgs) -> anyhow::Result<()> {
    println!("Operations (wavetrace process --op NAME --param key=value):");
    println!();
    for (name, description) in Operation::CATALOG {
        println!("  {name:24}  {description}");
    }

    println!();
    println!("Statistics (wavetrace stats --stat NAME --param key=value):");
    println!();
    for (name, description) in Statistic::CATALOG {
        println!("  {name:24}  {description}");
    }

    if args.examples {
        println!();
        println!("Examples:");
        println!();
        println!("  wavetrace process in.txt out.txt --op moving_median --param radius=3");
        println!(
            "  wavetrace process in.txt out.txt --op band_limited_power --param delta_t=20ns \\"
        );
        println!("      --param lo_freq=2MHz --param hi_freq=5MHz --param window_time=1us");
        println!("  wavetrace process in.txt out.txt --pipeline echo_envelope");
        println!("  wavetrace stats in.txt --stat spectral_maximum --param delta_t=20ns");
    }

    Ok(())
}
