//! Descriptive statistics over price series.
//!
//! All spreads use a two-pass computation: the mean first, then deviations
//! from it. Large price levels with small moves would otherwise lose most of
//! their significant digits to cancellation. Deviations are divided by the
//! largest one before squaring, so neither huge nor subnormal prices
//! overflow or vanish in the squares.

use stockstats_core::error::{StatsError, StatsResult};
use stockstats_core::types::{PriceSeries, StatResult};

/// Quotes needed before a sample standard deviation is defined.
pub const MIN_STD_DEV_SAMPLES: usize = 2;

/// Compute mean and sample standard deviation of a series' prices.
///
/// Fails with [`StatsError::InsufficientData`] when fewer than two quotes
/// are present, since the `n - 1` denominator is then undefined, and with
/// [`StatsError::InvalidSeries`] when the result is not representable.
pub fn compute(series: &PriceSeries) -> StatsResult<StatResult> {
    let prices = series.prices();
    let insufficient = || StatsError::InsufficientData {
        required: MIN_STD_DEV_SAMPLES,
        available: prices.len(),
    };

    let mean = mean_of(&prices).ok_or_else(insufficient)?;
    let std_dev = sample_std_dev(&prices).ok_or_else(insufficient)?;

    if !mean.is_finite() || !std_dev.is_finite() {
        return Err(StatsError::InvalidSeries {
            ticker: series.ticker().to_string(),
            reason: "price spread exceeds the floating point range".into(),
        });
    }

    Ok(StatResult {
        mean,
        std_dev,
        sample_count: prices.len(),
    })
}

/// Arithmetic mean of a series' prices. Defined for a single quote.
pub fn mean(series: &PriceSeries) -> StatsResult<f64> {
    mean_of(&series.prices()).ok_or(StatsError::InsufficientData {
        required: 1,
        available: 0,
    })
}

/// Arithmetic mean, `None` for an empty slice.
///
/// A constant slice returns its value exactly. Stays finite for finite
/// input even when the plain sum overflows.
pub fn mean_of(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    if values.iter().all(|&v| v == first) {
        return Some(first);
    }

    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        return Some(sum / n);
    }
    Some(values.iter().map(|v| v / n).sum())
}

/// Sample standard deviation (`n - 1` denominator), `None` below two values.
///
/// Zero exactly when every value is equal.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_STD_DEV_SAMPLES {
        return None;
    }

    let (deviations, scale) = scaled_deviations(values)?;
    if scale == 0.0 {
        return Some(0.0);
    }
    let sum_sq: f64 = deviations.iter().map(|d| d * d).sum();

    Some(scale * (sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Deviations from the mean divided by the largest absolute deviation,
/// together with that scale. `None` for an empty slice.
///
/// The scale is zero exactly when every value is equal, and infinite when
/// the spread itself overflows.
pub(crate) fn scaled_deviations(values: &[f64]) -> Option<(Vec<f64>, f64)> {
    let mean = mean_of(values)?;
    let scale = values
        .iter()
        .map(|v| (v - mean).abs())
        .fold(0.0, f64::max);

    if scale == 0.0 {
        return Some((vec![0.0; values.len()], 0.0));
    }
    Some((values.iter().map(|v| (v - mean) / scale).collect(), scale))
}
