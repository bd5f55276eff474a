use pseudobulk_cli::run_aggregate::*;
use pseudobulk_cli::run_simulate::*;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate single-cell expression into pseudobulk log2cpm
    Aggregate(AggregateArgs),

    /// Simulate single-cell count data for testing
    Simulate(SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Aggregate(args) => {
            run_aggregate(args.clone())?;
        }
        Commands::Simulate(args) => {
            run_simulate(args.clone())?;
        }
    }

    Ok(())
}
