//! CSV price source.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stockstats_core::error::DataSourceError;
use stockstats_core::traits::{validate_ticker, Catalog, PriceSource};
use stockstats_core::types::Quote;
use tracing::debug;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Timestamp",
        alias = "time",
        alias = "date",
        alias = "Date",
        alias = "lastUpdatedAt"
    )]
    timestamp: String,
    #[serde(alias = "Price", alias = "close", alias = "Close")]
    price: f64,
}

/// Price source reading recorded quotes from a directory of CSV files.
///
/// Each ticker lives in `<dir>/<TICKER>.csv` with `timestamp,price` columns.
/// Lookback windows are measured back from the newest quote in the file, and
/// [`PriceSource::reference_time`] reports the newest quote across the
/// requested tickers, so recorded data stays usable after the fact.
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    /// Create a new CSV price source over a directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DataSourceError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DataSourceError::Io(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    /// Directory being read.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locate the file for a ticker, trying the exact and lowercase names.
    fn file_for(&self, ticker: &str) -> Option<PathBuf> {
        let candidates = [
            self.dir.join(format!("{}.csv", ticker)),
            self.dir.join(format!("{}.csv", ticker.to_lowercase())),
        ];
        candidates.into_iter().find(|p| p.is_file())
    }

    /// Load every quote for a ticker, oldest first.
    async fn load_ticker(&self, ticker: &str) -> Result<Vec<Quote>, DataSourceError> {
        validate_ticker(ticker)?;
        let path = self
            .file_for(ticker)
            .ok_or_else(|| DataSourceError::UnknownTicker(ticker.to_string()))?;

        tokio::task::spawn_blocking(move || Self::load_from_path(&path))
            .await
            .map_err(|e| DataSourceError::Io(e.to_string()))?
    }

    /// Load all quotes from a specific path.
    fn load_from_path(path: &Path) -> Result<Vec<Quote>, DataSourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataSourceError::Io(e.to_string()))?;

        let mut quotes = Vec::new();

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataSourceError::Parse(e.to_string()))?;
            let timestamp = parse_timestamp(&record.timestamp)?;
            quotes.push(Quote::new(record.price, timestamp));
        }

        quotes.sort_by_key(|q| q.timestamp);

        Ok(quotes)
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn fetch_catalog(&self) -> Result<Catalog, DataSourceError> {
        let entries =
            std::fs::read_dir(&self.dir).map_err(|e| DataSourceError::Io(e.to_string()))?;

        let mut catalog = Catalog::new();
        for entry in entries {
            let path = entry.map_err(|e| DataSourceError::Io(e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                catalog.insert(stem.to_string(), stem.to_uppercase());
            }
        }

        Ok(catalog)
    }

    async fn fetch_price_series(
        &self,
        ticker: &str,
        minutes: u32,
    ) -> Result<Vec<Quote>, DataSourceError> {
        let quotes = self.load_ticker(ticker).await?;

        let Some(newest) = quotes.last().map(|q| q.timestamp) else {
            return Ok(quotes);
        };
        let cutoff = newest - Duration::minutes(i64::from(minutes));

        let recent: Vec<Quote> = quotes.into_iter().filter(|q| q.timestamp >= cutoff).collect();
        debug!(ticker, minutes, quotes = recent.len(), "loaded quotes from csv");

        Ok(recent)
    }

    async fn reference_time(&self, tickers: &[String]) -> Option<DateTime<Utc>> {
        let mut newest = None;
        for ticker in tickers {
            match self.load_ticker(ticker).await {
                Ok(quotes) => newest = newest.max(quotes.last().map(|q| q.timestamp)),
                Err(e) => debug!(ticker = %ticker, error = %e, "no reference time"),
            }
        }
        newest
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse various timestamp formats.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DataSourceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d"];
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc());
        }
        if let Ok(d) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    // Unix timestamp; milliseconds if more than 10 digits
    if let Ok(ts) = value.parse::<i64>() {
        let parsed = if ts > 10_000_000_000 {
            DateTime::from_timestamp_millis(ts)
        } else {
            DateTime::from_timestamp(ts, 0)
        };
        if let Some(dt) = parsed {
            return Ok(dt);
        }
    }

    Err(DataSourceError::Parse(format!(
        "Could not parse timestamp: {}",
        value
    )))
}
