//! Recovers `(year, value)` series from rasterised line charts.
//!
//! The core is a pure function from a decoded image and a
//! [`PipelineConfig`] to a yearly series ([`extract_series`]), plus an
//! optional anchor-based correction ([`calibrate`]). Everything else in the
//! crate (batch processing, exports, charts, debug images) is built on those
//! two calls.

pub mod analysis;
pub mod calibration;
pub mod capture;
pub mod config;
pub mod debug;
pub mod error;
pub mod grid;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod trace;
pub mod vision;

pub use calibration::{calibrate, CalibrationAnchor, DataPoint};
pub use config::PipelineConfig;
pub use error::{ChartError, Result};
pub use grid::{detect_grid, GridLines};
pub use pipeline::{extract_series, ChartExtraction, EmptyReason};
pub use trace::{extract_trend_line, PixelPoint};
