//! Pixel-to-data mapping and anchor-based correction.
//!
//! `coords` turns a pixel trace into a yearly series; `corrector` nudges
//! that series toward externally known anchor values, and `validate` reports
//! how far the raw series was from them.

pub mod anchors;
pub mod coords;
pub mod corrector;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use anchors::load_anchors;
pub use coords::{aggregate_yearly, map_to_data};
pub use corrector::calibrate;
pub use validate::{validate_series, AnchorCheck, AnchorOutcome, ValidationReport, ValidationStatus};

/// A recovered `(year, value)` sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub year: i32,
    pub value: f64,
}

impl DataPoint {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Externally supplied ground truth for one year.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationAnchor {
    pub year: i32,
    pub value: f64,
}

impl CalibrationAnchor {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Value recorded for `year`, if any.
pub fn value_at(series: &[DataPoint], year: i32) -> Option<f64> {
    series.iter().find(|p| p.year == year).map(|p| p.value)
}
