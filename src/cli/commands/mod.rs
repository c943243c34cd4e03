//! CLI command implementations.

pub mod catalog;
pub mod correlate;
pub mod stats;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use stockstats_config::AppConfig;
use stockstats_core::traits::PriceSource;
use stockstats_data::{CsvPriceSource, HttpPriceSource};
use stockstats_engine::StatsEngine;
use tracing::{info, warn};

/// Build the engine over the CSV directory if one is given, else the quote service.
pub fn build_engine(data: Option<&Path>, config: &AppConfig) -> Result<StatsEngine> {
    let source: Arc<dyn PriceSource> = match data {
        Some(dir) => Arc::new(
            CsvPriceSource::new(dir)
                .with_context(|| format!("Cannot read data directory {}", dir.display()))?,
        ),
        None => {
            let http = config.data_source.to_http_config();
            if http.token.is_none() {
                warn!(
                    token_env = %config.data_source.token_env,
                    "No API token configured, requests will be unauthenticated"
                );
            }
            Arc::new(HttpPriceSource::new(http).context("Failed to create quote service client")?)
        }
    };
    info!(source = source.name(), "Using price source");

    let settings = config
        .engine
        .to_settings()
        .context("Invalid engine configuration")?;

    Ok(StatsEngine::new(source, settings)?)
}
