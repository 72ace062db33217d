//! One chart, end to end.
//!
//! Crop, detect grid, trace the series, map to data space. Everything here
//! is deterministic and local to the call; calibration and all file output
//! happen in the batch layer.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::calibration::{map_to_data, DataPoint};
use crate::config::PipelineConfig;
use crate::debug::{render_overlay, DebugCapture};
use crate::error::Result;
use crate::grid::{self, GridLines, PlotBounds};
use crate::trace::{self, PixelPoint};
use crate::vision::crop_region;

/// Why an extraction produced no data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// No pixel matched the series colour above the noise threshold
    NoTraceFound,
}

/// Side information about how a series was recovered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Cropped region `(width, height)`
    pub region_size: (u32, u32),
    pub grid: GridLines,
    /// Value axis fell back to the region's top/bottom rows
    pub value_axis_fallback: bool,
    /// Year axis fell back to the region's left/right columns
    pub year_axis_fallback: bool,
    pub trace_points: usize,
    pub empty: Option<EmptyReason>,
}

/// Result of running the pipeline on one chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartExtraction {
    /// One point per year, ascending. Empty when `diagnostics.empty` is set.
    pub points: Vec<DataPoint>,
    pub diagnostics: Diagnostics,
}

impl ChartExtraction {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn usable(lines: &[u32]) -> bool {
    lines.len() >= 2 && lines.first() != lines.last()
}

struct Stages {
    extraction: ChartExtraction,
    region: RgbImage,
    bounds: PlotBounds,
    trace_points: Vec<PixelPoint>,
    trend_mask: Option<image::GrayImage>,
}

fn run_stages(image: &RgbImage, config: &PipelineConfig) -> Result<Stages> {
    config.validate()?;
    let region = crop_region(image, &config.crop.region())?;
    let (width, height) = region.dimensions();
    log::debug!(
        "Chart area extracted: {}x{} (from {}x{}, {} profile)",
        width,
        height,
        image.width(),
        image.height(),
        config.crop.name()
    );

    let bounds = PlotBounds::new(&config.plot_area(), width, height);
    let grid = grid::detect_grid(&region, config);
    let traced = trace::trace_trend(&region, &config.trend);

    let mut diagnostics = Diagnostics {
        region_size: (width, height),
        value_axis_fallback: !usable(&grid.horizontal),
        year_axis_fallback: !usable(&grid.vertical),
        trace_points: traced.points.len(),
        grid,
        empty: None,
    };

    let points = if traced.points.is_empty() {
        diagnostics.empty = Some(EmptyReason::NoTraceFound);
        Vec::new()
    } else {
        if diagnostics.value_axis_fallback {
            log::warn!("Fewer than 2 horizontal grid lines; using region top/bottom for values");
        }
        if diagnostics.year_axis_fallback {
            log::debug!("Fewer than 2 vertical grid lines; using region left/right for years");
        }
        map_to_data(&traced.points, &diagnostics.grid, (width, height), &config.axis)
    };

    Ok(Stages {
        extraction: ChartExtraction {
            points,
            diagnostics,
        },
        region,
        bounds,
        trace_points: traced.points,
        trend_mask: traced.mask,
    })
}

/// Recovers the yearly series from a decoded chart.
///
/// Errors only on an invalid crop region or axis range. A chart with nothing to recover
/// yields an empty extraction with `diagnostics.empty` set.
pub fn extract_series(image: &RgbImage, config: &PipelineConfig) -> Result<ChartExtraction> {
    Ok(run_stages(image, config)?.extraction)
}

/// Like [`extract_series`], also returning intermediate images.
pub fn extract_with_debug(
    image: &RgbImage,
    config: &PipelineConfig,
) -> Result<(ChartExtraction, DebugCapture)> {
    let stages = run_stages(image, config)?;
    let grid_masks = grid::color::grid_masks(&stages.region, &config.grid.color);
    let overlay = render_overlay(
        &stages.region,
        &stages.bounds,
        &stages.extraction.diagnostics.grid,
        &stages.trace_points,
    );

    let capture = DebugCapture {
        region: stages.region,
        trend_mask: stages.trend_mask,
        grid_masks,
        overlay,
    };
    Ok((stages.extraction, capture))
}
