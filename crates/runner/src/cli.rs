//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bloomload")]
#[command(about = "Load generator for the inventory item-creation endpoint", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a load test and print the check summary
    Run(RunArgs),

    /// Show the requests one iteration would send, without sending them
    Preview(PreviewArgs),
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ScenarioArgs {
    /// Request shape: "single" (one endpoint) or "dual" (gateway + direct)
    #[arg(short, long)]
    pub scenario: Option<String>,

    /// TOML settings file (overridden by BLOOMLOAD_* env vars and flags)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: ScenarioArgs,

    /// Number of concurrent virtual users
    #[arg(long)]
    pub vus: Option<u64>,

    /// Test duration (e.g. 30s, 10m, 1h)
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Exit non-zero when the overall check pass rate is below this (0.0 - 1.0)
    #[arg(long)]
    pub min_pass_rate: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub common: ScenarioArgs,

    /// Worker id to build the payload for
    #[arg(short, long, default_value = "1")]
    pub worker: u64,

    /// Iteration number to build the payload for
    #[arg(short, long, default_value = "0")]
    pub iteration: u64,
}
