//! Pipeline orchestration.
//!
//! This module provides:
//! - Single-chart extraction (`extract_series`, `extract_with_debug`)
//! - The batch work queue (`queue`)
//! - Batch discovery, processing and summary (`batch`)

pub mod batch;
pub mod queue;
pub mod runner;

pub use batch::{
    discover_charts, process_chart, run_batch, write_summary, BatchSummary, ChartReport,
    ChartStatus,
};
pub use queue::ChartJob;
pub use runner::{extract_series, extract_with_debug, ChartExtraction, Diagnostics, EmptyReason};
