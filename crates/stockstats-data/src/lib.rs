//! Price sources for the statistics engine.
//!
//! - [`HttpPriceSource`]: the REST quote service (catalog + per-ticker history)
//! - [`CsvPriceSource`]: recorded quotes from a directory of CSV files

mod csv_source;
pub mod http;

pub use csv_source::CsvPriceSource;
pub use http::{HttpPriceSource, HttpSourceConfig, DEFAULT_BASE_URL};
