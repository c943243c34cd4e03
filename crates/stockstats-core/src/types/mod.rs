//! Core data types for the statistics engine.

mod quote;
mod results;
mod window;

pub use quote::{PriceSeries, Quote};
pub use results::{AlignedSample, CorrelationMatrix, StatResult};
pub use window::{
    validate_minutes, TimeWindow, DEFAULT_WINDOW_MINUTES, MAX_WINDOW_MINUTES, MIN_WINDOW_MINUTES,
};
