//! Error types for the statistics engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("Insufficient data: need {required} quotes, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    #[error("Invalid price series for {ticker}: {reason}")]
    InvalidSeries { ticker: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl StatsError {
    /// Whether repeating the same request may succeed.
    ///
    /// Only upstream failures are transient; everything else is a property
    /// of the requested window or inputs.
    pub fn is_retryable(&self) -> bool {
        match self {
            StatsError::DataSource(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Errors raised by a price source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Rate limited by upstream")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl DataSourceError {
    /// Upstream failures are always worth retrying from the caller's side.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

/// Errors raised while aligning series or building a correlation matrix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("No series contains any quotes")]
    NoData,

    #[error("Series do not overlap in time (latest start {start}, earliest end {end})")]
    NoOverlap {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid bucket configuration: {0}")]
    InvalidBuckets(String),

    #[error("Need aligned data for at least {required} tickers, have {available}")]
    InsufficientTickers { required: usize, available: usize },
}

/// Result type alias for engine operations.
pub type StatsResult<T> = Result<T, StatsError>;
