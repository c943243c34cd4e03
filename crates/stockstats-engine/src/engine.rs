//! Statistics engine.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use stockstats_analytics::{
    build_correlation_matrix, compute, select, AlignConfig, Aligner, MIN_CORRELATION_TICKERS,
};
use stockstats_core::error::{AlignmentError, StatsError, StatsResult};
use stockstats_core::traits::{Catalog, PriceSource};
use stockstats_core::types::{PriceSeries, StatResult, TimeWindow, DEFAULT_WINDOW_MINUTES};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::orchestrator::{dedup, FetchOrchestrator, FetchPolicy};
use crate::report::{CorrelationReport, ExcludedTicker};

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Lookback used when a caller has no preference
    pub default_minutes: u32,
    pub fetch: FetchPolicy,
    pub align: AlignConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_minutes: DEFAULT_WINDOW_MINUTES,
            fetch: FetchPolicy::default(),
            align: AlignConfig::default(),
        }
    }
}

/// Computes statistics and correlations over live or recorded price data.
///
/// Every call fetches fresh data; nothing is cached between requests.
/// Windows end at the source's reference time, which is now for live
/// sources and the newest recorded quote for file-backed ones.
pub struct StatsEngine {
    source: Arc<dyn PriceSource>,
    orchestrator: FetchOrchestrator,
    aligner: Aligner,
    settings: EngineSettings,
}

impl StatsEngine {
    /// Create an engine over a price source.
    pub fn new(source: Arc<dyn PriceSource>, settings: EngineSettings) -> StatsResult<Self> {
        let aligner = Aligner::new(settings.align)?;
        let orchestrator = FetchOrchestrator::new(source.clone(), settings.fetch);

        Ok(Self {
            source,
            orchestrator,
            aligner,
            settings,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// End of a window over `tickers`: the source's reference time, or now.
    pub async fn window_end(&self, tickers: &[String]) -> DateTime<Utc> {
        match self.source.reference_time(tickers).await {
            Some(end) => end,
            None => Utc::now(),
        }
    }

    /// Ticker catalog of the underlying source.
    pub async fn get_catalog(&self) -> StatsResult<Catalog> {
        let catalog = self.source.fetch_catalog().await?;
        info!(source = self.source.name(), tickers = catalog.len(), "fetched catalog");
        Ok(catalog)
    }

    /// Mean and standard deviation of `ticker` over the last `minutes`.
    pub async fn get_statistics(&self, ticker: &str, minutes: u32) -> StatsResult<StatResult> {
        let end = self.window_end(&[ticker.to_string()]).await;
        self.get_statistics_at(ticker, minutes, end).await
    }

    /// As [`get_statistics`](Self::get_statistics), with the window ending at `end`.
    pub async fn get_statistics_at(
        &self,
        ticker: &str,
        minutes: u32,
        end: DateTime<Utc>,
    ) -> StatsResult<StatResult> {
        let window = TimeWindow::new(minutes, end)?;
        if ticker.is_empty() {
            return Err(StatsError::InvalidRequest("ticker must not be empty".into()));
        }

        let span = info_span!("statistics", request_id = %Uuid::new_v4(), ticker, minutes);
        async move {
            let series = self.orchestrator.fetch_one(ticker, minutes).await?;
            let windowed = select(&series, &window);
            let stats = compute(&windowed)?;

            info!(
                mean = stats.mean,
                std_dev = stats.std_dev,
                samples = stats.sample_count,
                "computed statistics"
            );
            Ok::<_, StatsError>(stats)
        }
        .instrument(span)
        .await
    }

    /// Pairwise correlation of `tickers` over the last `minutes`.
    pub async fn get_correlation_matrix(
        &self,
        tickers: &[String],
        minutes: u32,
    ) -> StatsResult<CorrelationReport> {
        let end = self.window_end(tickers).await;
        self.get_correlation_matrix_at(tickers, minutes, end).await
    }

    /// As [`get_correlation_matrix`](Self::get_correlation_matrix), with the
    /// window ending at `end`.
    ///
    /// Tickers that cannot be fetched are reported in
    /// [`CorrelationReport::excluded`] instead of failing the request. The
    /// request fails when fewer than two tickers have data in the window or
    /// their data does not overlap.
    pub async fn get_correlation_matrix_at(
        &self,
        tickers: &[String],
        minutes: u32,
        end: DateTime<Utc>,
    ) -> StatsResult<CorrelationReport> {
        let window = TimeWindow::new(minutes, end)?;
        let tickers = dedup(tickers);
        if tickers.iter().any(|t| t.is_empty()) {
            return Err(StatsError::InvalidRequest("ticker must not be empty".into()));
        }
        if tickers.len() < MIN_CORRELATION_TICKERS {
            return Err(StatsError::InvalidRequest(format!(
                "correlation needs at least {} distinct tickers, got {}",
                MIN_CORRELATION_TICKERS,
                tickers.len()
            )));
        }

        let span = info_span!(
            "correlation",
            request_id = %Uuid::new_v4(),
            tickers = tickers.len(),
            minutes
        );
        async move {
            let outcome = self.orchestrator.fetch_all(&tickers, minutes).await;

            let excluded: Vec<ExcludedTicker> = outcome
                .failures
                .into_iter()
                .map(|failure| {
                    warn!(ticker = %failure.ticker, error = %failure.error, "excluding ticker");
                    ExcludedTicker {
                        ticker: failure.ticker,
                        reason: failure.error.to_string(),
                    }
                })
                .collect();

            let windowed: Vec<PriceSeries> =
                outcome.series.iter().map(|s| select(s, &window)).collect();

            let with_data = windowed.iter().filter(|s| !s.is_empty()).count();
            if with_data < MIN_CORRELATION_TICKERS {
                return Err(StatsError::from(AlignmentError::InsufficientTickers {
                    required: MIN_CORRELATION_TICKERS,
                    available: with_data,
                }));
            }

            let samples = self.aligner.align(&windowed, &window)?;
            let names: Vec<String> = windowed.iter().map(|s| s.ticker().to_string()).collect();
            let matrix = build_correlation_matrix(&samples, &names)?;

            info!(
                included = matrix.len(),
                excluded = excluded.len(),
                samples = samples.len(),
                "computed correlation matrix"
            );

            Ok::<_, StatsError>(CorrelationReport {
                window,
                matrix,
                excluded,
                sample_count: samples.len(),
            })
        }
        .instrument(span)
        .await
    }
}
