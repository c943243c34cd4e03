//! Quote and price series types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// A single timestamped price observation for one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Observed price
    pub price: f64,
    /// Observation time
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Create a new quote.
    pub fn new(price: f64, timestamp: DateTime<Utc>) -> Self {
        Self { price, timestamp }
    }
}

/// Immutable, strictly time-ordered quotes for one ticker.
///
/// An empty series is valid and means "no data". Deserialization goes
/// through [`PriceSeries::new`], so it enforces the same ordering rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct PriceSeries {
    ticker: String,
    quotes: Vec<Quote>,
}

#[derive(Deserialize)]
struct RawSeries {
    ticker: String,
    quotes: Vec<Quote>,
}

impl TryFrom<RawSeries> for PriceSeries {
    type Error = StatsError;

    fn try_from(raw: RawSeries) -> StatsResult<Self> {
        PriceSeries::new(raw.ticker, raw.quotes)
    }
}

impl PriceSeries {
    /// Create a series, rejecting quotes that are not strictly increasing in time.
    pub fn new(ticker: impl Into<String>, quotes: Vec<Quote>) -> StatsResult<Self> {
        let ticker = ticker.into();

        if let Some(pos) = quotes
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(StatsError::InvalidSeries {
                reason: format!(
                    "quote {} at {} does not follow {}",
                    pos + 1,
                    quotes[pos + 1].timestamp,
                    quotes[pos].timestamp
                ),
                ticker,
            });
        }

        if let Some(bad) = quotes.iter().find(|q| !q.price.is_finite()) {
            return Err(StatsError::InvalidSeries {
                reason: format!("non-finite price at {}", bad.timestamp),
                ticker,
            });
        }

        Ok(Self { ticker, quotes })
    }

    /// Create a series from quotes in arbitrary order.
    ///
    /// Quotes are sorted by timestamp; when several share a timestamp the
    /// one appearing last in the input wins. Non-finite prices are dropped.
    pub fn from_unordered(ticker: impl Into<String>, quotes: impl IntoIterator<Item = Quote>) -> Self {
        let mut quotes: Vec<Quote> = quotes.into_iter().filter(|q| q.price.is_finite()).collect();

        // Stable sort keeps input order among equal timestamps.
        quotes.sort_by_key(|q| q.timestamp);

        let mut deduped: Vec<Quote> = Vec::with_capacity(quotes.len());
        for quote in quotes {
            match deduped.last_mut() {
                Some(prev) if prev.timestamp == quote.timestamp => *prev = quote,
                _ => deduped.push(quote),
            }
        }

        Self {
            ticker: ticker.into(),
            quotes: deduped,
        }
    }

    /// Create an empty series.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            quotes: Vec::new(),
        }
    }

    /// Ticker symbol.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// All quotes, oldest first.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Oldest quote.
    pub fn first(&self) -> Option<&Quote> {
        self.quotes.first()
    }

    /// Newest quote.
    pub fn last(&self) -> Option<&Quote> {
        self.quotes.last()
    }

    /// Timestamps of the oldest and newest quotes.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Extract prices as a vector.
    pub fn prices(&self) -> Vec<f64> {
        self.quotes.iter().map(|q| q.price).collect()
    }

    /// Build a new series for the same ticker from a subset of quotes.
    ///
    /// Callers must pass an ordered subsequence of this series' quotes.
    pub fn with_quotes(&self, quotes: Vec<Quote>) -> Self {
        debug_assert!(quotes.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self {
            ticker: self.ticker.clone(),
            quotes,
        }
    }

    /// Get an iterator over the quotes.
    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.iter()
    }
}
