//! Correlation command.

use anyhow::{Context, Result};
use stockstats_engine::StatsEngine;
use tracing::info;

use crate::cli::{CorrelateArgs, OutputFormat};

pub async fn run(args: CorrelateArgs, engine: &StatsEngine) -> Result<()> {
    let minutes = args.minutes.unwrap_or(engine.settings().default_minutes);
    let tickers: Vec<String> = args
        .tickers
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    info!(tickers = ?tickers, minutes, "Computing correlation matrix");

    let report = engine
        .get_correlation_matrix(&tickers, minutes)
        .await
        .context("Failed to compute correlation matrix")?;

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    Ok(())
}
