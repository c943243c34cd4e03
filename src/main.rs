//! Price statistics CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{commands, Cli, Commands};
use stockstats_config::load_config_or_default;
use stockstats_monitor::{setup_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    // Setup logging
    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let format = LogFormat::from_json(cli.json_logs || config.logging.is_json());
    let _log_guard = setup_logging(&level, format, config.logging.file.as_deref());

    // Execute command
    match cli.command {
        Commands::ValidateConfig => commands::validate::run(&config, cli.config.as_deref()).await,
        Commands::Stats(args) => {
            let engine = commands::build_engine(cli.data.as_deref(), &config)?;
            commands::stats::run(args, &engine).await
        }
        Commands::Correlate(args) => {
            let engine = commands::build_engine(cli.data.as_deref(), &config)?;
            commands::correlate::run(args, &engine).await
        }
        Commands::Catalog(args) => {
            let engine = commands::build_engine(cli.data.as_deref(), &config)?;
            commands::catalog::run(args, &engine).await
        }
    }
}
