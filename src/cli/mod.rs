//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stockstats")]
#[command(author, version, about = "Price statistics and cross-ticker correlation")]
pub struct Cli {
    /// Configuration file path (defaults plus environment overrides when omitted)
    #[arg(short, long, env = "STOCKSTATS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level, overriding the configured one
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Read recorded quotes from a directory of CSV files instead of the quote service
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mean and standard deviation of one ticker
    Stats(StatsArgs),
    /// Correlation matrix across tickers
    Correlate(CorrelateArgs),
    /// List tickers offered by the data source
    Catalog(CatalogArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct StatsArgs {
    /// Ticker symbol
    pub ticker: String,

    /// Lookback in minutes
    #[arg(short, long)]
    pub minutes: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct CorrelateArgs {
    /// Tickers to correlate (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub tickers: Vec<String>,

    /// Lookback in minutes
    #[arg(short, long)]
    pub minutes: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct CatalogArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub output: OutputFormat,
}
