mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::waterfall::{AllocateArgs, SweepArgs};

/// Hurdle-rate waterfall allocation with decimal precision
#[derive(Parser)]
#[command(
    name = "waterfall",
    version,
    about = "Hurdle-rate waterfall allocation and scenario sweeps",
    long_about = "Distributes pooled-investment proceeds (or losses) across capital \
                  tranches under a hurdle-rate waterfall: preferred return to the base \
                  tranche first, excess profit by a global or range-based policy, and \
                  losses absorbed junior-first. Sweeps a range of achieved returns for \
                  charting."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one waterfall allocation for a single achieved return
    Allocate(AllocateArgs),
    /// Run the allocation across a ladder of achieved returns
    Sweep(SweepArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Allocate(args) => commands::waterfall::run_allocate(args),
        Commands::Sweep(args) => commands::waterfall::run_sweep(args),
        Commands::Version => {
            println!("waterfall {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
