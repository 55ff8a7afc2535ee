mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analyze::{AnalyzeArgs, SeriesArgs};
use commands::mortgage::PaymentArgs;

/// Leveraged real-estate vs. stock-market investment analysis
#[derive(Parser)]
#[command(
    name = "rvest",
    version,
    about = "Compare a leveraged property purchase against a stock-market investment",
    long_about = "Derives mortgage economics, income metrics, a discounted-cash-flow \
                  valuation (NPV/IRR), and a stock-market counterfactual from a single \
                  scenario, with decimal precision. Scenarios come from JSON/YAML files, \
                  piped JSON, or individual flags."
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
    /// Calculate the full metric bundle for a scenario
    Analyze(AnalyzeArgs),
    /// Project the year-by-year series (cash flow, equity, stock value)
    Series(SeriesArgs),
    /// Mortgage payment, remaining balance, and optional schedule
    Payment(PaymentArgs),
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
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Series(args) => commands::analyze::run_series(args),
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Version => {
            println!("rvest {}", env!("CARGO_PKG_VERSION"));
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
