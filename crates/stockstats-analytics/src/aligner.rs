//! Alignment of independently timed series onto common sample points.
//!
//! Tickers report quotes at their own irregular instants, while paired
//! computations need coincident observations. The aligner cuts the period
//! that every series covers into fixed buckets and, for each bucket end,
//! takes each ticker's most recent quote at or before it (step semantics).
//! Values are never interpolated: a ticker with nothing at or before a bucket
//! end is simply absent from that sample.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use stockstats_core::error::AlignmentError;
use stockstats_core::types::{AlignedSample, PriceSeries, Quote, TimeWindow};
use tracing::debug;

use crate::window;

/// Buckets produced when no explicit width is configured.
pub const DEFAULT_BUCKET_COUNT: usize = 60;

/// Upper bound on sample points per alignment, whether set by count or width.
pub const MAX_BUCKET_COUNT: usize = 10_000;

/// Bucket layout for alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignConfig {
    /// Number of equal buckets the overlap is split into
    pub bucket_count: usize,
    /// Fixed bucket width; overrides `bucket_count` when set
    pub bucket_width: Option<Duration>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            bucket_width: None,
        }
    }
}

impl AlignConfig {
    /// Split the overlap into `count` equal buckets.
    pub fn with_bucket_count(count: usize) -> Self {
        Self {
            bucket_count: count,
            bucket_width: None,
        }
    }

    /// Use buckets of a fixed width.
    pub fn with_bucket_width(width: Duration) -> Self {
        Self {
            bucket_width: Some(width),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), AlignmentError> {
        if self.bucket_count == 0 {
            return Err(AlignmentError::InvalidBuckets(
                "bucket count must be greater than 0".into(),
            ));
        }
        if self.bucket_count > MAX_BUCKET_COUNT {
            return Err(AlignmentError::InvalidBuckets(format!(
                "bucket count must be at most {}, got {}",
                MAX_BUCKET_COUNT, self.bucket_count
            )));
        }
        if let Some(width) = self.bucket_width {
            if width <= Duration::zero() {
                return Err(AlignmentError::InvalidBuckets(format!(
                    "bucket width must be positive, got {}",
                    width
                )));
            }
        }
        Ok(())
    }
}

/// Maps several price series onto a shared, ordered set of sample points.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    config: AlignConfig,
}

impl Aligner {
    /// Create an aligner with the given bucket layout.
    pub fn new(config: AlignConfig) -> Result<Self, AlignmentError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Bucket layout in use.
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Align `series` over the part of `window` that all of them cover.
    ///
    /// Only quotes inside `window` are considered. Empty series take no
    /// part in the overlap and never appear in a sample. Tickers are
    /// expected to be distinct.
    ///
    /// # Errors
    /// * [`AlignmentError::NoData`] if no series has a quote in the window
    /// * [`AlignmentError::NoOverlap`] if the covered ranges do not intersect
    /// * [`AlignmentError::InvalidBuckets`] if a fixed width would cut the
    ///   overlap into more than [`MAX_BUCKET_COUNT`] buckets
    pub fn align(
        &self,
        series: &[PriceSeries],
        window: &TimeWindow,
    ) -> Result<Vec<AlignedSample>, AlignmentError> {
        let in_window: Vec<(&str, &[Quote])> = series
            .iter()
            .map(|s| (s.ticker(), window::slice(s.quotes(), window)))
            .filter(|(_, quotes)| !quotes.is_empty())
            .collect();

        if in_window.is_empty() {
            return Err(AlignmentError::NoData);
        }

        let mut start = window.start();
        let mut end = window.end();
        for (_, quotes) in &in_window {
            start = start.max(quotes[0].timestamp);
            end = end.min(quotes[quotes.len() - 1].timestamp);
        }

        if start > end {
            return Err(AlignmentError::NoOverlap { start, end });
        }

        let points = self.sample_points(start, end)?;
        let mut rows: Vec<BTreeMap<String, f64>> = vec![BTreeMap::new(); points.len()];

        // One forward-only cursor per ticker.
        for (ticker, quotes) in &in_window {
            let mut cursor = 0;
            let mut current = None;

            for (row, point) in rows.iter_mut().zip(&points) {
                while cursor < quotes.len() && quotes[cursor].timestamp <= *point {
                    current = Some(quotes[cursor].price);
                    cursor += 1;
                }
                if let Some(value) = current {
                    row.insert((*ticker).to_string(), value);
                }
            }
        }

        let samples: Vec<AlignedSample> = points
            .into_iter()
            .zip(rows)
            .filter(|(_, values)| !values.is_empty())
            .map(|(timestamp, values)| AlignedSample { timestamp, values })
            .collect();

        debug!(
            tickers = in_window.len(),
            samples = samples.len(),
            %start,
            %end,
            "aligned series"
        );

        Ok(samples)
    }

    /// Bucket end timestamps covering `[start, end]`, ascending and distinct.
    ///
    /// The last point is always exactly `end`.
    fn sample_points(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, AlignmentError> {
        let span_ms = (end - start).num_milliseconds();
        if span_ms <= 0 {
            return Ok(vec![end]);
        }

        let mut points: Vec<DateTime<Utc>> = match self.config.bucket_width {
            Some(width) => {
                let width_ms = width.num_milliseconds().max(1);
                let count = (span_ms + width_ms - 1) / width_ms;
                if count > MAX_BUCKET_COUNT as i64 {
                    return Err(AlignmentError::InvalidBuckets(format!(
                        "bucket width of {} ms cuts {} ms into {} buckets, at most {} allowed",
                        width_ms, span_ms, count, MAX_BUCKET_COUNT
                    )));
                }
                (1..=count)
                    .map(|k| (start + Duration::milliseconds(width_ms * k)).min(end))
                    .collect()
            }
            None => {
                let count = self.config.bucket_count as i64;
                (1..=count)
                    .map(|k| start + Duration::milliseconds(span_ms * k / count))
                    .collect()
            }
        };

        if let Some(last) = points.last_mut() {
            *last = end;
        }
        points.dedup();
        Ok(points)
    }
}
