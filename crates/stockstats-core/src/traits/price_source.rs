//! Price source trait definitions.

use crate::error::DataSourceError;
use crate::types::Quote;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Ticker catalog: display name to ticker symbol.
pub type Catalog = BTreeMap<String, String>;

/// Trait for quote history providers.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the catalog of tradable tickers.
    async fn fetch_catalog(&self) -> Result<Catalog, DataSourceError>;

    /// Fetch recent quotes for a ticker.
    ///
    /// # Arguments
    /// * `ticker` - The ticker symbol
    /// * `minutes` - Lookback in minutes, `1..=1440`
    ///
    /// # Returns
    /// Quotes in no guaranteed order. An empty vector means the ticker has
    /// no recent quotes and is not an error.
    async fn fetch_price_series(
        &self,
        ticker: &str,
        minutes: u32,
    ) -> Result<Vec<Quote>, DataSourceError>;

    /// Instant that lookback windows for `tickers` should end at.
    ///
    /// Live sources return `None`, meaning the current time. Recorded
    /// sources return the newest quote they hold for any of `tickers`.
    async fn reference_time(&self, _tickers: &[String]) -> Option<DateTime<Utc>> {
        None
    }

    /// Get the source name.
    fn name(&self) -> &str;
}

/// Reject ticker symbols that cannot be used in a URL path or file name.
///
/// Symbols are ASCII alphanumerics plus `.`, `-`, `^` and `_`, and may not
/// start with `.`.
pub fn validate_ticker(ticker: &str) -> Result<(), DataSourceError> {
    let valid = !ticker.is_empty()
        && !ticker.starts_with('.')
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '_'));
    if valid {
        Ok(())
    } else {
        Err(DataSourceError::UnknownTicker(ticker.to_string()))
    }
}
