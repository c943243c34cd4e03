//! Report generation.

use serde::{Deserialize, Serialize};
use std::fmt;
use stockstats_core::types::{CorrelationMatrix, StatResult, TimeWindow};

const RULE_HEAVY: &str = "═══════════════════════════════════════════════════════════\n";
const RULE_LIGHT: &str = "───────────────────────────────────────────────────────────\n";

/// A ticker left out of a correlation matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTicker {
    pub ticker: String,
    /// Why its data was unavailable
    pub reason: String,
}

/// Correlation matrix together with what went into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Window the matrix was computed over
    pub window: TimeWindow,
    /// Matrix over the successfully fetched tickers, in request order
    pub matrix: CorrelationMatrix,
    /// Tickers whose fetch failed
    pub excluded: Vec<ExcludedTicker>,
    /// Number of aligned sample points
    pub sample_count: usize,
}

/// Descriptive statistics for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub ticker: String,
    pub window: TimeWindow,
    pub stats: StatResult,
}

/// Qualitative reading of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    StrongPositive,
    ModeratePositive,
    Weak,
    ModerateNegative,
    StrongNegative,
}

impl CorrelationStrength {
    /// Bands: `|r| >= 0.7` strong, `|r| >= 0.3` moderate, otherwise weak.
    pub fn classify(r: f64) -> Self {
        match r {
            r if r >= 0.7 => Self::StrongPositive,
            r if r >= 0.3 => Self::ModeratePositive,
            r if r > -0.3 => Self::Weak,
            r if r > -0.7 => Self::ModerateNegative,
            _ => Self::StrongNegative,
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::StrongPositive => "strong positive",
            Self::ModeratePositive => "moderate positive",
            Self::Weak => "weak",
            Self::ModerateNegative => "moderate negative",
            Self::StrongNegative => "strong negative",
        };
        f.write_str(label)
    }
}

impl StatisticsReport {
    pub fn new(ticker: impl Into<String>, window: TimeWindow, stats: StatResult) -> Self {
        Self {
            ticker: ticker.into(),
            window,
            stats,
        }
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(RULE_HEAVY);
        s.push_str(&format!("  STATISTICS  {}\n", self.ticker));
        s.push_str(RULE_HEAVY);
        s.push_str(&format!("  Window:              {}\n", self.window));
        s.push_str(RULE_LIGHT);
        s.push_str(&format!("  Mean:                {:.4}\n", self.stats.mean));
        s.push_str(&format!("  Std Dev:             {:.4}\n", self.stats.std_dev));
        s.push_str(&format!("  Samples:             {}\n", self.stats.sample_count));
        s.push_str(RULE_HEAVY);

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl CorrelationReport {
    /// Generate a text summary: the matrix as a grid, then each pair with
    /// its strength, then excluded tickers.
    pub fn summary(&self) -> String {
        let tickers = self.matrix.tickers();
        let width = tickers.iter().map(|t| t.len()).max().unwrap_or(0).max(8);

        let mut s = String::new();

        s.push_str(RULE_HEAVY);
        s.push_str("                   CORRELATION MATRIX                      \n");
        s.push_str(RULE_HEAVY);
        s.push_str(&format!("  Window:              {}\n", self.window));
        s.push_str(&format!("  Aligned Samples:     {}\n", self.sample_count));
        s.push('\n');

        s.push_str(&format!("  {:width$}", ""));
        for ticker in tickers {
            s.push_str(&format!(" {:>width$}", ticker));
        }
        s.push('\n');
        for (i, ticker) in tickers.iter().enumerate() {
            s.push_str(&format!("  {:width$}", ticker));
            for j in 0..tickers.len() {
                s.push_str(&format!(" {:>width$}", format_cell(self.matrix.at(i, j))));
            }
            s.push('\n');
        }
        s.push('\n');

        s.push_str("PAIRS\n");
        s.push_str(RULE_LIGHT);
        for i in 0..tickers.len() {
            for j in (i + 1)..tickers.len() {
                let line = match self.matrix.at(i, j) {
                    Some(r) => format!("{:+.4}  {}", r, CorrelationStrength::classify(r)),
                    None => "n/a".to_string(),
                };
                s.push_str(&format!("  {} / {}: {}\n", tickers[i], tickers[j], line));
            }
        }

        if !self.excluded.is_empty() {
            s.push('\n');
            s.push_str("EXCLUDED\n");
            s.push_str(RULE_LIGHT);
            for excluded in &self.excluded {
                s.push_str(&format!("  {}: {}\n", excluded.ticker, excluded.reason));
            }
        }

        s.push_str(RULE_HEAVY);

        s
    }

    /// Export to JSON. Undefined cells serialize as `null`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(r) => format!("{:.4}", r),
        None => "n/a".to_string(),
    }
}
