//! Statistics engine: concurrent fetching, windowing, alignment and reports.

mod engine;
mod orchestrator;
mod report;

#[cfg(test)]
mod testing;

pub use engine::{EngineSettings, StatsEngine};
pub use orchestrator::{FetchFailure, FetchOrchestrator, FetchOutcome, FetchPolicy};
pub use report::{CorrelationReport, CorrelationStrength, ExcludedTicker, StatisticsReport};
