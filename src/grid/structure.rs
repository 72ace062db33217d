//! Edge-based grid detection.
//!
//! Works on charts whose grid colour falls outside the grey presets: a row
//! is a grid line when its strong horizontal edges span enough of the width
//! in only a few unbroken runs.

use image::RgbImage;

use super::{filter, GridLines, PlotBounds};
use crate::analysis::statistics;
use crate::config::{PipelineConfig, StructureGridConfig};
use crate::vision::edges::{self, Field, Gradient};

/// Lengths of the consecutive `true` runs in `flags`.
fn runs(flags: impl IntoIterator<Item = bool>) -> Vec<usize> {
    let mut segments = Vec::new();
    let mut current = 0;
    for on in flags {
        if on {
            current += 1;
        } else if current > 0 {
            segments.push(current);
            current = 0;
        }
    }
    if current > 0 {
        segments.push(current);
    }
    segments
}

fn is_line(segments: &[usize], min_span: f32, max_segments: usize) -> bool {
    let total: usize = segments.iter().sum();
    total as f32 >= min_span && !segments.is_empty() && segments.len() <= max_segments
}

/// Magnitude at or above which an edge counts as strong.
fn strong_threshold(field: &Field, percentile: f64) -> f32 {
    let sorted = statistics::sorted(field.data.iter().map(|&v| v as f64));
    statistics::percentile(&sorted, percentile) as f32
}

fn is_strong(value: f32, threshold: f32) -> bool {
    value > 0.0 && value >= threshold
}

/// Rows that look like horizontal lines in the d/dy magnitude field.
pub fn horizontal_candidates(gray: &Field, config: &StructureGridConfig) -> Vec<u32> {
    let field = edges::sobel(gray, Gradient::Vertical);
    let threshold = strong_threshold(&field, config.edge_percentile);
    let min_span = gray.width as f32 * config.min_horizontal_span;

    (0..field.height)
        .filter(|&y| {
            let segments = runs(field.row(y).iter().map(|&v| is_strong(v, threshold)));
            is_line(&segments, min_span, config.max_segments)
        })
        .collect()
}

/// Columns that look like vertical lines in the d/dx magnitude field.
pub fn vertical_candidates(gray: &Field, config: &StructureGridConfig) -> Vec<u32> {
    let field = edges::sobel(gray, Gradient::Horizontal);
    let threshold = strong_threshold(&field, config.edge_percentile);
    let min_span = gray.height as f32 * config.min_vertical_span;

    (0..field.width)
        .filter(|&x| {
            let column = (0..field.height).map(|y| is_strong(field.get(x, y), threshold));
            is_line(&runs(column), min_span, config.max_segments)
        })
        .collect()
}

pub fn detect(region: &RgbImage, config: &PipelineConfig) -> GridLines {
    let gray = edges::grayscale(region);
    let rows = horizontal_candidates(&gray, &config.grid.structure);
    let columns = vertical_candidates(&gray, &config.grid.structure);
    log::debug!(
        "Structure-based detection: {} horizontal, {} vertical candidates",
        rows.len(),
        columns.len()
    );

    let bounds = PlotBounds::new(&config.plot_area(), region.width(), region.height());
    GridLines {
        horizontal: filter::finalize(
            &rows,
            config.grid.merge_tolerance,
            bounds.top,
            bounds.bottom,
            config.grid.expected_horizontal,
        ),
        vertical: filter::finalize(
            &columns,
            config.grid.merge_tolerance,
            bounds.left,
            bounds.right,
            config.expected_vertical(),
        ),
    }
}
