//! Core traits for the statistics engine.

mod price_source;

pub use price_source::{validate_ticker, Catalog, PriceSource};
