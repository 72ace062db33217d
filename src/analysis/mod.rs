//! Output sinks for recovered series.
//!
//! This module provides:
//! - Order statistics shared across the pipeline
//! - Series summaries and job-count conversion
//! - Per-technology charts of raw vs calibrated series
//! - JSON export

pub mod charts;
pub mod config;
pub mod export;
pub mod statistics;
pub mod summary;

pub use config::ChartStyle;
pub use export::{export_to_json, write_series};
pub use summary::{job_counts, JobCount, SeriesSummary};
