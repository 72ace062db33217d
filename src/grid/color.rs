//! Colour-based grid detection.
//!
//! Masks light-grey pixels, isolates long horizontal and vertical runs with
//! directional openings, and keeps rows/columns whose mask coverage clears
//! the configured threshold.

use image::{GrayImage, RgbImage};

use super::{filter, GridLines, PlotBounds};
use crate::config::{ColorGridConfig, PipelineConfig};
use crate::vision::morphology::{self, Kernel};
use crate::vision::{count_nonzero, in_range, to_hsv, HsvImage, HsvRange};

/// Picks the grey range that masks the most pixels.
///
/// Returns `None` when no range matches anything.
pub fn best_grey_mask(hsv: &HsvImage, ranges: &[HsvRange]) -> Option<GrayImage> {
    let mut best: Option<(usize, GrayImage)> = None;

    for (i, range) in ranges.iter().enumerate() {
        let mask = in_range(hsv, range);
        let pixel_count = count_nonzero(&mask);
        log::debug!("Grey range {}: {} pixels", i + 1, pixel_count);

        if pixel_count > best.as_ref().map_or(0, |(count, _)| *count) {
            best = Some((pixel_count, mask));
        }
    }

    best.map(|(_, mask)| mask)
}

/// Horizontal and vertical grid masks after directional opening.
pub fn grid_masks(region: &RgbImage, config: &ColorGridConfig) -> (GrayImage, GrayImage) {
    let (w, h) = region.dimensions();
    let hsv = to_hsv(region);
    let Some(grey) = best_grey_mask(&hsv, &config.grey_ranges) else {
        log::debug!("No grey pixels detected in any range");
        return (GrayImage::new(w, h), GrayImage::new(w, h));
    };

    let length = config.kernel_length.max(1);
    let horizontal = morphology::open(&grey, Kernel::rect(length, 1));
    let vertical = morphology::open(&grey, Kernel::rect(1, length));

    log::debug!(
        "Light grey masks: {} horizontal px, {} vertical px",
        count_nonzero(&horizontal),
        count_nonzero(&vertical)
    );

    (horizontal, vertical)
}

/// Rows whose mask coverage exceeds `coverage` of the width.
pub fn covered_rows(mask: &GrayImage, coverage: f32) -> Vec<u32> {
    let (w, h) = mask.dimensions();
    if w == 0 {
        return Vec::new();
    }
    (0..h)
        .filter(|&y| {
            let on = (0..w).filter(|&x| mask.get_pixel(x, y)[0] > 0).count();
            on as f32 / w as f32 >= coverage
        })
        .collect()
}

/// Columns whose mask coverage exceeds `coverage` of the height.
pub fn covered_columns(mask: &GrayImage, coverage: f32) -> Vec<u32> {
    let (w, h) = mask.dimensions();
    if h == 0 {
        return Vec::new();
    }
    (0..w)
        .filter(|&x| {
            let on = (0..h).filter(|&y| mask.get_pixel(x, y)[0] > 0).count();
            on as f32 / h as f32 >= coverage
        })
        .collect()
}

pub fn detect(region: &RgbImage, config: &PipelineConfig) -> GridLines {
    let color = &config.grid.color;
    let (horizontal_mask, vertical_mask) = grid_masks(region, color);
    let bounds = PlotBounds::new(&config.plot_area(), region.width(), region.height());

    let rows = covered_rows(&horizontal_mask, color.coverage);
    let columns = covered_columns(&vertical_mask, color.coverage);
    log::debug!(
        "Colour grid candidates: {} rows, {} columns",
        rows.len(),
        columns.len()
    );

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
