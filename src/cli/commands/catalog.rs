//! Catalog command.

use anyhow::{Context, Result};
use stockstats_engine::StatsEngine;

use crate::cli::{CatalogArgs, OutputFormat};

pub async fn run(args: CatalogArgs, engine: &StatsEngine) -> Result<()> {
    let catalog = engine
        .get_catalog()
        .await
        .context("Failed to fetch ticker catalog")?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
        OutputFormat::Text => {
            let mut entries: Vec<(&String, &String)> =
                catalog.iter().map(|(name, ticker)| (ticker, name)).collect();
            entries.sort();

            println!("Available Tickers");
            println!("═══════════════════════════════════════════════════════════");
            for (ticker, name) in entries {
                println!("  {:<8} {}", ticker, name);
            }
        }
    }

    Ok(())
}
