//! Time-series analytics over price series.
//!
//! This crate provides the pure, synchronous half of the engine:
//! - Window selection (`[end - minutes, end]` filtering)
//! - Descriptive statistics (mean, sample standard deviation)
//! - Alignment of irregularly timed series onto shared bucket points
//! - Pairwise Pearson correlation matrices
//!
//! Nothing here performs I/O; every function is deterministic in its inputs.

pub mod aligner;
pub mod correlation;
pub mod statistics;
pub mod window;

pub use aligner::{AlignConfig, Aligner, DEFAULT_BUCKET_COUNT, MAX_BUCKET_COUNT};
pub use correlation::{build_correlation_matrix, pearson, MIN_CORRELATION_TICKERS};
pub use statistics::{compute, mean, sample_std_dev};
pub use window::select;
