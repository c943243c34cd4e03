//! Core types and traits for the statistics engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Quote, PriceSeries, TimeWindow)
//! - Computation results (StatResult, AlignedSample, CorrelationMatrix)
//! - The price source contract consumed by the engine
//! - The error taxonomy shared by every crate in the workspace

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AlignmentError, DataSourceError, StatsError, StatsResult};
pub use traits::*;
pub use types::*;
