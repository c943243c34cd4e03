//! Concurrent fan-out of price fetches.

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use stockstats_core::error::DataSourceError;
use stockstats_core::traits::PriceSource;
use stockstats_core::types::PriceSeries;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, warn};

/// Time limits applied to fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Limit for a single ticker's fetch
    pub per_fetch_timeout: Duration,
    /// Limit for a whole fan-out, measured from its start
    pub deadline: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            per_fetch_timeout: Duration::from_secs(5),
            deadline: Duration::from_secs(15),
        }
    }
}

/// A ticker whose fetch did not produce a series.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub ticker: String,
    pub error: DataSourceError,
}

/// Result of a fan-out: successes and failures, each in request order.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub series: Vec<PriceSeries>,
    pub failures: Vec<FetchFailure>,
}

/// Fetches price series for many tickers at once.
pub struct FetchOrchestrator {
    source: Arc<dyn PriceSource>,
    policy: FetchPolicy,
}

impl FetchOrchestrator {
    /// Create an orchestrator over a price source.
    pub fn new(source: Arc<dyn PriceSource>, policy: FetchPolicy) -> Self {
        Self { source, policy }
    }

    /// Active time limits.
    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetch a single ticker, bounded by the tighter of the two limits.
    pub async fn fetch_one(&self, ticker: &str, minutes: u32) -> Result<PriceSeries, DataSourceError> {
        let limit = self.policy.per_fetch_timeout.min(self.policy.deadline);
        self.fetch_with_timeout(ticker, minutes, limit).await
    }

    /// Fetch every ticker concurrently.
    ///
    /// Duplicate tickers are fetched once. Each result is stored by its
    /// position in the de-duplicated request, so ordering never depends on
    /// completion order. Fetches still running at the deadline are dropped
    /// and reported as timeouts; anything already finished is kept.
    pub async fn fetch_all(&self, tickers: &[String], minutes: u32) -> FetchOutcome {
        let tickers = dedup(tickers);
        let deadline = Instant::now() + self.policy.deadline;

        let mut slots: Vec<Option<Result<PriceSeries, DataSourceError>>> =
            (0..tickers.len()).map(|_| None).collect();

        {
            let mut pending: FuturesUnordered<_> = tickers
                .iter()
                .enumerate()
                .map(|(idx, ticker)| async move {
                    let result = self
                        .fetch_with_timeout(ticker, minutes, self.policy.per_fetch_timeout)
                        .await;
                    (idx, result)
                })
                .collect();

            loop {
                let next = timeout_at(deadline, pending.next()).await;
                match next {
                    Ok(Some((idx, result))) => slots[idx] = Some(result),
                    Ok(None) => break,
                    Err(_) => {
                        warn!(
                            unfinished = pending.len(),
                            deadline_ms = self.policy.deadline.as_millis() as u64,
                            "fetch deadline reached"
                        );
                        break;
                    }
                }
            }
        }

        let mut outcome = FetchOutcome::default();
        for (ticker, slot) in tickers.into_iter().zip(slots) {
            match slot {
                Some(Ok(series)) => outcome.series.push(series),
                Some(Err(error)) => outcome.failures.push(FetchFailure { ticker, error }),
                None => outcome.failures.push(FetchFailure {
                    ticker,
                    error: DataSourceError::Timeout {
                        elapsed_ms: self.policy.deadline.as_millis() as u64,
                    },
                }),
            }
        }

        outcome
    }

    async fn fetch_with_timeout(
        &self,
        ticker: &str,
        minutes: u32,
        limit: Duration,
    ) -> Result<PriceSeries, DataSourceError> {
        let started = Instant::now();

        let result = match timeout(limit, self.source.fetch_price_series(ticker, minutes)).await {
            Ok(Ok(quotes)) => Ok(PriceSeries::from_unordered(ticker, quotes)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DataSourceError::Timeout {
                elapsed_ms: limit.as_millis() as u64,
            }),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(series) => debug!(
                ticker,
                source = self.source.name(),
                quotes = series.len(),
                elapsed_ms,
                "fetched series"
            ),
            Err(e) => debug!(ticker, source = self.source.name(), elapsed_ms, error = %e, "fetch failed"),
        }

        result
    }
}

/// Drop repeated tickers, keeping first occurrence order.
pub(crate) fn dedup(tickers: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        if !out.contains(ticker) {
            out.push(ticker.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockSource, Reply};

    fn names(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    fn quick_policy() -> FetchPolicy {
        FetchPolicy {
            per_fetch_timeout: Duration::from_millis(200),
            deadline: Duration::from_millis(500),
        }
    }

    #[tokio::test]
    async fn test_results_follow_request_order() {
        // B answers first, A last.
        let source = MockSource::new()
            .with("A", Reply::delayed(&[1.0, 2.0], 60))
            .with("B", Reply::prices(&[3.0, 4.0]))
            .with("C", Reply::delayed(&[5.0, 6.0], 20));
        let orchestrator = FetchOrchestrator::new(Arc::new(source), quick_policy());

        let outcome = orchestrator.fetch_all(&names(&["A", "B", "C"]), 30).await;

        let order: Vec<_> = outcome.series.iter().map(|s| s.ticker()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_collected() {
        let source = MockSource::new()
            .with("A", Reply::prices(&[1.0, 2.0]))
            .with("B", Reply::Fail(DataSourceError::RateLimited));
        let orchestrator = FetchOrchestrator::new(Arc::new(source), quick_policy());

        let outcome = orchestrator.fetch_all(&names(&["A", "B", "Z"]), 30).await;

        assert_eq!(outcome.series.len(), 1);
        assert_eq!(
            outcome.failures,
            vec![
                FetchFailure {
                    ticker: "B".into(),
                    error: DataSourceError::RateLimited
                },
                FetchFailure {
                    ticker: "Z".into(),
                    error: DataSourceError::UnknownTicker("Z".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out_alone() {
        let source = MockSource::new()
            .with("A", Reply::prices(&[1.0, 2.0]))
            .with("SLOW", Reply::delayed(&[1.0, 2.0], 5_000));
        let orchestrator = FetchOrchestrator::new(Arc::new(source), quick_policy());

        let outcome = orchestrator.fetch_all(&names(&["A", "SLOW"]), 30).await;

        assert_eq!(outcome.series.len(), 1);
        assert_eq!(outcome.failures[0].ticker, "SLOW");
        assert_eq!(
            outcome.failures[0].error,
            DataSourceError::Timeout { elapsed_ms: 200 }
        );
    }

    #[tokio::test]
    async fn test_deadline_keeps_finished_fetches() {
        let policy = FetchPolicy {
            per_fetch_timeout: Duration::from_secs(10),
            deadline: Duration::from_millis(150),
        };
        let source = MockSource::new()
            .with("A", Reply::prices(&[1.0, 2.0]))
            .with("B", Reply::delayed(&[3.0, 4.0], 10))
            .with("SLOW", Reply::delayed(&[1.0], 5_000));
        let orchestrator = FetchOrchestrator::new(Arc::new(source), policy);

        let started = std::time::Instant::now();
        let outcome = orchestrator.fetch_all(&names(&["SLOW", "A", "B"]), 30).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        let order: Vec<_> = outcome.series.iter().map(|s| s.ticker()).collect();
        assert_eq!(order, vec!["A", "B"]);
        assert_eq!(
            outcome.failures,
            vec![FetchFailure {
                ticker: "SLOW".into(),
                error: DataSourceError::Timeout { elapsed_ms: 150 }
            }]
        );
    }

    #[tokio::test]
    async fn test_duplicates_fetched_once() {
        let source = Arc::new(MockSource::new().with("A", Reply::prices(&[1.0, 2.0])));
        let orchestrator = FetchOrchestrator::new(source.clone(), quick_policy());

        let outcome = orchestrator.fetch_all(&names(&["A", "A", "A"]), 30).await;

        assert_eq!(outcome.series.len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_one_sorts_quotes() {
        let mut quotes = Reply::quotes(&[1.0, 2.0, 3.0]);
        quotes.reverse();
        let source = MockSource::new().with("A", Reply::Quotes(quotes));
        let orchestrator = FetchOrchestrator::new(Arc::new(source), quick_policy());

        let series = orchestrator.fetch_one("A", 30).await.unwrap();
        assert_eq!(series.prices(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_dedup_preserves_first_occurrence() {
        assert_eq!(dedup(&names(&["B", "A", "B", "C", "A"])), names(&["B", "A", "C"]));
    }
}
