//! Statistics command.

use anyhow::{Context, Result};
use stockstats_core::types::TimeWindow;
use stockstats_engine::{StatisticsReport, StatsEngine};

use crate::cli::{OutputFormat, StatsArgs};

pub async fn run(args: StatsArgs, engine: &StatsEngine) -> Result<()> {
    let minutes = args.minutes.unwrap_or(engine.settings().default_minutes);
    let end = engine.window_end(&[args.ticker.clone()]).await;
    let window = TimeWindow::new(minutes, end)?;

    let stats = engine
        .get_statistics_at(&args.ticker, minutes, window.end())
        .await
        .with_context(|| format!("Failed to compute statistics for {}", args.ticker))?;

    let report = StatisticsReport::new(args.ticker, window, stats);
    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    Ok(())
}
