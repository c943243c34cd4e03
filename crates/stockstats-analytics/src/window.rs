//! Window selection over price series.

use stockstats_core::types::{PriceSeries, Quote, TimeWindow};

/// Select the quotes of `series` that fall inside `window`.
///
/// Order is preserved and nothing is interpolated. A window holding no
/// quotes yields an empty series for the same ticker.
pub fn select(series: &PriceSeries, window: &TimeWindow) -> PriceSeries {
    series.with_quotes(slice(series.quotes(), window).to_vec())
}

/// Borrow the sub-slice of time-ordered `quotes` inside `window`.
pub(crate) fn slice<'a>(quotes: &'a [Quote], window: &TimeWindow) -> &'a [Quote] {
    let start = window.start();
    let end = window.end();

    let lo = quotes.partition_point(|q| q.timestamp < start);
    let hi = quotes.partition_point(|q| q.timestamp <= end);

    if lo >= hi {
        &[]
    } else {
        &quotes[lo..hi]
    }
}
