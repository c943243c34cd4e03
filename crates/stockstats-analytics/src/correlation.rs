//! Pairwise Pearson correlation over aligned samples.

use stockstats_core::error::AlignmentError;
use stockstats_core::types::{AlignedSample, CorrelationMatrix};
use tracing::debug;

use crate::statistics::{scaled_deviations, MIN_STD_DEV_SAMPLES};

/// Tickers that must have aligned data for a matrix to be built.
pub const MIN_CORRELATION_TICKERS: usize = 2;

/// Build a symmetric correlation matrix for `tickers` from aligned samples.
///
/// Every cell uses pairwise-complete observations: only samples holding both
/// tickers contribute, so cells may rest on different sample counts. A cell
/// with fewer than two pairs or a zero-variance side is `None`; undefined
/// cells never abort the build.
///
/// Duplicate tickers are collapsed, keeping first occurrence order.
///
/// # Errors
/// [`AlignmentError::InsufficientTickers`] when fewer than two of the
/// requested tickers appear in any sample.
pub fn build_correlation_matrix(
    samples: &[AlignedSample],
    tickers: &[String],
) -> Result<CorrelationMatrix, AlignmentError> {
    let mut ordered: Vec<String> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        if !ordered.contains(ticker) {
            ordered.push(ticker.clone());
        }
    }

    let available = ordered
        .iter()
        .filter(|t| samples.iter().any(|s| s.values.contains_key(t.as_str())))
        .count();
    if available < MIN_CORRELATION_TICKERS {
        return Err(AlignmentError::InsufficientTickers {
            required: MIN_CORRELATION_TICKERS,
            available,
        });
    }

    let n = ordered.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let cell = if i == j {
                diagonal(samples, &ordered[i])
            } else {
                let (xs, ys) = paired(samples, &ordered[i], &ordered[j]);
                pearson(&xs, &ys)
            };
            values[i][j] = cell;
            values[j][i] = cell;
        }
    }

    debug!(tickers = n, available, samples = samples.len(), "built correlation matrix");

    Ok(CorrelationMatrix::new(ordered, values))
}

/// Pearson coefficient of two equally long slices.
///
/// `None` below two pairs or when either side has zero variance. Works on
/// scaled deviations, so the coefficient stays defined for any finite
/// spread. The result is clamped to `[-1, 1]` against rounding overshoot.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < MIN_STD_DEV_SAMPLES {
        return None;
    }

    let (dx, scale_x) = scaled_deviations(xs)?;
    let (dy, scale_y) = scaled_deviations(ys)?;
    if scale_x == 0.0 || scale_y == 0.0 {
        return None;
    }

    let sxy: f64 = dx.iter().zip(&dy).map(|(a, b)| a * b).sum();
    let sxx: f64 = dx.iter().map(|a| a * a).sum();
    let syy: f64 = dy.iter().map(|b| b * b).sum();
    // Both sums are at least 1, so the product cannot underflow.
    let r = sxy / (sxx * syy).sqrt();

    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Self-correlation is 1 whenever the ticker's values vary at all.
fn diagonal(samples: &[AlignedSample], ticker: &str) -> Option<f64> {
    let xs: Vec<f64> = samples.iter().filter_map(|s| s.get(ticker)).collect();
    if xs.len() < MIN_STD_DEV_SAMPLES {
        return None;
    }
    match scaled_deviations(&xs) {
        Some((_, scale)) if scale > 0.0 && scale.is_finite() => Some(1.0),
        _ => None,
    }
}

fn paired(samples: &[AlignedSample], a: &str, b: &str) -> (Vec<f64>, Vec<f64>) {
    samples.iter().filter_map(|s| s.pair(a, b)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn at(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 21, 9, 0, 0).unwrap() + Duration::seconds(i * 10)
    }

    /// Build samples from columns; `None` leaves a ticker out of that sample.
    fn samples(columns: &[(&str, &[Option<f64>])]) -> Vec<AlignedSample> {
        let len = columns[0].1.len();
        (0..len)
            .map(|i| {
                let values: BTreeMap<String, f64> = columns
                    .iter()
                    .filter_map(|(t, col)| col[i].map(|v| (t.to_string(), v)))
                    .collect();
                AlignedSample {
                    timestamp: at(i as i64),
                    values,
                }
            })
            .collect()
    }

    fn names(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    fn assert_matrix_invariants(matrix: &CorrelationMatrix) {
        let n = matrix.len();
        for i in 0..n {
            if let Some(d) = matrix.at(i, i) {
                assert_eq!(d, 1.0);
            }
            for j in 0..n {
                assert_eq!(matrix.at(i, j), matrix.at(j, i));
                if let Some(v) = matrix.at(i, j) {
                    assert!((-1.0..=1.0).contains(&v), "cell ({i},{j}) = {v}");
                }
            }
        }
    }

    #[test]
    fn test_perfectly_co_moving_series() {
        let a = [100.0, 102.0, 101.0, 103.0, 99.5, 104.25];
        let b: Vec<f64> = a.iter().map(|v| 2.0 * v).collect();
        let col_a: Vec<_> = a.iter().copied().map(Some).collect();
        let col_b: Vec<_> = b.iter().copied().map(Some).collect();

        let data = samples(&[("A", &col_a[..]), ("B", &col_b[..])]);
        let matrix = build_correlation_matrix(&data, &names(&["A", "B"])).unwrap();

        assert!((matrix.get("A", "B").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix.get("A", "A"), Some(1.0));
        assert_eq!(matrix.get("B", "B"), Some(1.0));
        assert_matrix_invariants(&matrix);
    }

    #[test]
    fn test_perfectly_opposed_series() {
        let col_a = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let col_b = [Some(8.0), Some(6.0), Some(4.0), Some(2.0)];

        let data = samples(&[("A", &col_a[..]), ("B", &col_b[..])]);
        let matrix = build_correlation_matrix(&data, &names(&["A", "B"])).unwrap();

        assert!((matrix.get("A", "B").unwrap() + 1.0).abs() < 1e-12);
        assert_matrix_invariants(&matrix);
    }

    #[test]
    fn test_matches_statrs_pearson() {
        use statrs::statistics::Statistics;

        let xs = [3.1, 4.7, 2.2, 5.9, 6.3, 4.4, 3.8];
        let ys = [1.0, 2.1, 1.7, 3.3, 2.9, 2.2, 2.5];

        let expected = xs.covariance(ys) / (xs.std_dev() * ys.std_dev());
        assert!((pearson(&xs, &ys).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_is_undefined() {
        let col_a = [Some(1.0), Some(2.0), Some(3.0)];
        let col_c = [Some(5.0), Some(5.0), Some(5.0)];

        let data = samples(&[("A", &col_a[..]), ("C", &col_c[..])]);
        let matrix = build_correlation_matrix(&data, &names(&["A", "C"])).unwrap();

        assert_eq!(matrix.get("A", "A"), Some(1.0));
        assert_eq!(matrix.get("C", "C"), None);
        assert_eq!(matrix.get("A", "C"), None);
        assert_eq!(matrix.get("C", "A"), None);
        assert_matrix_invariants(&matrix);
    }

    #[test]
    fn test_pairwise_complete_observations() {
        // C only overlaps A on the last three samples.
        let col_a = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let col_b = [Some(2.0), Some(1.0), Some(4.0), Some(3.0), Some(6.0)];
        let col_c = [None, None, Some(9.0), Some(8.0), Some(7.0)];

        let data = samples(&[("A", &col_a[..]), ("B", &col_b[..]), ("C", &col_c[..])]);
        let matrix = build_correlation_matrix(&data, &names(&["A", "B", "C"])).unwrap();

        // A/C uses only [3, 4, 5] vs [9, 8, 7].
        assert!((matrix.get("A", "C").unwrap() + 1.0).abs() < 1e-12);

        // A/B uses all five pairs.
        let expected = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 6.0]).unwrap();
        assert_eq!(matrix.get("A", "B"), Some(expected));
        assert_matrix_invariants(&matrix);
    }

    #[test]
    fn test_single_pair_is_undefined() {
        let col_a = [Some(1.0), Some(2.0), Some(3.0)];
        let col_b = [Some(1.0), Some(2.0), Some(3.0)];
        let col_c = [None, None, Some(3.0)];

        let data = samples(&[("A", &col_a[..]), ("B", &col_b[..]), ("C", &col_c[..])]);
        let matrix = build_correlation_matrix(&data, &names(&["A", "B", "C"])).unwrap();

        assert_eq!(matrix.get("A", "C"), None);
        assert_eq!(matrix.get("C", "C"), None);
        assert!(matrix.is_defined("A", "B"));
    }

    #[test]
    fn test_ticker_without_samples_keeps_row() {
        let col_a = [Some(1.0), Some(2.0), Some(4.0)];
        let col_b = [Some(3.0), Some(1.0), Some(2.0)];

        let data = samples(&[("A", &col_a[..]), ("B", &col_b[..])]);
        let matrix = build_correlation_matrix(&data, &names(&["A", "B", "Z"])).unwrap();

        assert_eq!(matrix.tickers(), &names(&["A", "B", "Z"])[..]);
        assert_eq!(matrix.get("Z", "Z"), None);
        assert_eq!(matrix.get("A", "Z"), None);
        assert_matrix_invariants(&matrix);
    }

    #[test]
    fn test_requires_two_tickers_with_data() {
        let col_a = [Some(1.0), Some(2.0)];
        let data = samples(&[("A", &col_a[..])]);

        let err = build_correlation_matrix(&data, &names(&["A", "B"])).unwrap_err();
        assert_eq!(
            err,
            AlignmentError::InsufficientTickers {
                required: 2,
                available: 1
            }
        );

        let err = build_correlation_matrix(&[], &names(&["A", "B"])).unwrap_err();
        assert!(matches!(err, AlignmentError::InsufficientTickers { available: 0, .. }));
    }

    #[test]
    fn test_duplicate_tickers_collapse() {
        let col_a = [Some(1.0), Some(2.0), Some(4.0)];
        let col_b = [Some(3.0), Some(1.0), Some(2.0)];

        let data = samples(&[("A", &col_a[..]), ("B", &col_b[..])]);
        let matrix = build_correlation_matrix(&data, &names(&["B", "A", "B"])).unwrap();
        assert_eq!(matrix.tickers(), &names(&["B", "A"])[..]);
    }

    #[test]
    fn test_row_order_follows_request() {
        let col_a = [Some(1.0), Some(2.0), Some(4.0)];
        let col_b = [Some(3.0), Some(1.0), Some(2.0)];
        let data = samples(&[("A", &col_a[..]), ("B", &col_b[..])]);

        let ab = build_correlation_matrix(&data, &names(&["A", "B"])).unwrap();
        let ba = build_correlation_matrix(&data, &names(&["B", "A"])).unwrap();

        assert_eq!(ab.index_of("A"), Some(0));
        assert_eq!(ba.index_of("A"), Some(1));
        assert_eq!(ab.get("A", "B"), ba.get("A", "B"));
    }

    #[test]
    fn test_extreme_magnitudes_stay_defined() {
        let xs = [1.7e308, -1.7e308, 1.7e308, -1.6e308];
        let ys = [2.0, 1.0, 2.0, 1.0];
        let r = pearson(&xs, &ys).unwrap();
        assert!(r > 0.99 && r <= 1.0);

        // Subnormal steps whose mean is exactly representable.
        let tiny = f64::from_bits(1);
        let steps = [0.0, 2.0 * tiny, 4.0 * tiny];
        assert_eq!(pearson(&steps, &[1.0, 2.0, 3.0]), Some(1.0));

        let col_t = steps.map(Some);
        let col_u = [Some(1.0), Some(2.0), Some(3.0)];
        let data = samples(&[("T", &col_t[..]), ("U", &col_u[..])]);
        let matrix = build_correlation_matrix(&data, &names(&["T", "U"])).unwrap();
        assert_eq!(matrix.get("T", "T"), Some(1.0));
        assert_matrix_invariants(&matrix);
    }
}
