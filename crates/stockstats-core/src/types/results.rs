//! Computation result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values of several tickers at one common sample point.
///
/// Only tickers that had a quote at or before `timestamp` are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSample {
    /// Sample point
    pub timestamp: DateTime<Utc>,
    /// Value per ticker
    pub values: BTreeMap<String, f64>,
}

impl AlignedSample {
    /// Value for a ticker, if present in this sample.
    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.values.get(ticker).copied()
    }

    /// Both values of a pair, if both tickers are present.
    pub fn pair(&self, a: &str, b: &str) -> Option<(f64, f64)> {
        Some((self.get(a)?, self.get(b)?))
    }
}

/// Descriptive statistics over a price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatResult {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Number of quotes used
    pub sample_count: usize,
}

/// Symmetric Pearson correlation matrix.
///
/// `tickers` fixes the row and column order. A `None` cell is undefined:
/// fewer than two paired observations or zero variance on either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Assemble a matrix from its parts.
    ///
    /// # Panics
    /// Panics if `values` is not `tickers.len()` square.
    pub fn new(tickers: Vec<String>, values: Vec<Vec<Option<f64>>>) -> Self {
        let n = tickers.len();
        assert!(
            values.len() == n && values.iter().all(|row| row.len() == n),
            "correlation grid must be {n}x{n}"
        );
        Self { tickers, values }
    }

    /// Tickers in row/column order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Raw grid.
    pub fn values(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Position of a ticker in the row/column order.
    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// Cell by position.
    pub fn at(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }

    /// Cell by ticker pair. `None` if either ticker is unknown or the cell is undefined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.at(self.index_of(a)?, self.index_of(b)?)
    }

    /// Whether the cell for a pair holds a coefficient.
    pub fn is_defined(&self, a: &str, b: &str) -> bool {
        self.get(a, b).is_some()
    }
}
