//! Grid line detection.
//!
//! Two interchangeable strategies locate the horizontal and vertical grid
//! lines of a cropped chart region. Both share the same post-filter (merge
//! nearby candidates, restrict to the plotting area, cap the count).

pub mod color;
pub mod filter;
pub mod structure;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::config::{GridStrategy, PipelineConfig};
use crate::vision::CropRegion;

/// Detected grid lines in region pixel coordinates, both sorted ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLines {
    /// Row indices
    pub horizontal: Vec<u32>,
    /// Column indices
    pub vertical: Vec<u32>,
}

impl GridLines {
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }
}

/// Inclusive pixel bounds of the plotting area inside a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlotBounds {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl PlotBounds {
    pub fn new(area: &CropRegion, width: u32, height: u32) -> Self {
        let (x0, y0, x1, y1) = area.to_pixels(width, height);
        Self {
            top: y0,
            bottom: y1.saturating_sub(1).max(y0),
            left: x0,
            right: x1.saturating_sub(1).max(x0),
        }
    }
}

/// Locates grid lines with the configured strategy.
pub fn detect_grid(region: &RgbImage, config: &PipelineConfig) -> GridLines {
    let lines = match config.grid.strategy {
        GridStrategy::Color => color::detect(region, config),
        GridStrategy::Structure => structure::detect(region, config),
    };
    log::info!(
        "Grid ({:?}): {} horizontal, {} vertical lines",
        config.grid.strategy,
        lines.horizontal.len(),
        lines.vertical.len()
    );
    lines
}
