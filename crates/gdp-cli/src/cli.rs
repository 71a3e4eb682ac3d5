use clap::{Parser, Subcommand, ValueEnum};
use gdp_algo::{BackendKind, Formulation};
use gdp_core::Grouping;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gdp", author, version, about = "Ground Delay Program planning models", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capacity scenario generators
    Scenarios {
        #[command(subcommand)]
        command: ScenariosCommands,
    },
    /// Solve one case of an experiment file
    Solve {
        /// Experiment file (YAML or JSON)
        #[arg(long)]
        spec: PathBuf,
        /// Case to solve; defaults to the first case
        #[arg(long)]
        case: Option<String>,
        #[arg(long, default_value = "extended-diversion")]
        formulation: Formulation,
        #[arg(long, default_value = "microlp")]
        backend: BackendKind,
        /// Wall-clock limit in seconds
        #[arg(long)]
        time_limit: Option<f64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Forward solver log output
        #[arg(long)]
        verbose: bool,
    },
    /// Solve every case and formulation of an experiment file
    Batch {
        /// Experiment file (YAML or JSON)
        #[arg(long)]
        spec: PathBuf,
        /// Output directory for results.csv and batch_manifest.json
        #[arg(short, long)]
        out: PathBuf,
        /// Worker threads (0 = all cores)
        #[arg(long, default_value_t = 0)]
        threads: usize,
        #[arg(long, default_value = "microlp")]
        backend: BackendKind,
        /// Per-job wall-clock limit in seconds
        #[arg(long)]
        time_limit: Option<f64>,
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScenariosCommands {
    /// Single switch from a low to a high arrival rate at an uncertain period
    LowToHigh {
        #[arg(long)]
        periods: usize,
        /// First candidate change period (inclusive)
        #[arg(long)]
        earliest: usize,
        /// Last candidate change period (exclusive)
        #[arg(long)]
        latest: usize,
        /// Arrivals per hour before the change
        #[arg(long)]
        low: u32,
        /// Arrivals per hour after the change
        #[arg(long)]
        high: u32,
        #[arg(long, default_value_t = 4)]
        periods_per_hour: usize,
        /// Put 40% of the probability on the first hour of candidates
        #[arg(long)]
        alt_probs: bool,
        #[arg(long, default_value_t = 0)]
        lookahead: usize,
        #[arg(long, default_value = "window")]
        grouping: Grouping,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
