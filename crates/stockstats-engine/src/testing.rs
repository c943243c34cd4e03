//! In-memory price source for engine tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use stockstats_core::error::DataSourceError;
use stockstats_core::traits::{Catalog, PriceSource};
use stockstats_core::types::Quote;

/// Timestamp of the first generated quote.
pub fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 21, 9, 0, 0).unwrap()
}

pub fn at(secs: i64) -> DateTime<Utc> {
    base() + Duration::seconds(secs)
}

#[derive(Debug, Clone)]
pub enum Reply {
    Quotes(Vec<Quote>),
    Delayed(Vec<Quote>, u64),
    Fail(DataSourceError),
}

impl Reply {
    /// Quotes 30 seconds apart starting at [`base`].
    pub fn quotes(prices: &[f64]) -> Vec<Quote> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Quote::new(p, at(i as i64 * 30)))
            .collect()
    }

    pub fn prices(prices: &[f64]) -> Self {
        Reply::Quotes(Self::quotes(prices))
    }

    pub fn delayed(prices: &[f64], delay_ms: u64) -> Self {
        Reply::Delayed(Self::quotes(prices), delay_ms)
    }

    /// Quotes at explicit offsets from [`base`], in seconds.
    pub fn timed(points: &[(i64, f64)]) -> Self {
        Reply::Quotes(points.iter().map(|&(s, p)| Quote::new(p, at(s))).collect())
    }
}

#[derive(Debug, Default)]
pub struct MockSource {
    replies: HashMap<String, Reply>,
    reference: Option<DateTime<Utc>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ticker: &str, reply: Reply) -> Self {
        self.replies.insert(ticker.to_string(), reply);
        self
    }

    /// Behave like a recorded source whose newest quote is at `time`.
    pub fn with_reference_time(mut self, time: DateTime<Utc>) -> Self {
        self.reference = Some(time);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for MockSource {
    async fn fetch_catalog(&self) -> Result<Catalog, DataSourceError> {
        Ok(self
            .replies
            .keys()
            .map(|t| (format!("{} Inc.", t), t.clone()))
            .collect())
    }

    async fn fetch_price_series(
        &self,
        ticker: &str,
        _minutes: u32,
    ) -> Result<Vec<Quote>, DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.replies.get(ticker) {
            Some(Reply::Quotes(quotes)) => Ok(quotes.clone()),
            Some(Reply::Delayed(quotes, delay_ms)) => {
                tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                Ok(quotes.clone())
            }
            Some(Reply::Fail(e)) => Err(e.clone()),
            None => Err(DataSourceError::UnknownTicker(ticker.to_string())),
        }
    }

    async fn reference_time(&self, _tickers: &[String]) -> Option<DateTime<Utc>> {
        self.reference
    }

    fn name(&self) -> &str {
        "mock"
    }
}
