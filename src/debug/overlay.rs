//! Annotated overlay of a cropped chart region.
//!
//! Draws the plot-area rectangle, detected grid lines and the extracted
//! trace on a copy of the region.

use image::{Rgb, RgbImage};

use crate::grid::{GridLines, PlotBounds};
use crate::trace::PixelPoint;

pub const PLOT_AREA_COLOR: Rgb<u8> = Rgb([0, 120, 255]);
pub const GRID_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
pub const TRACE_COLOR: Rgb<u8> = Rgb([220, 0, 0]);

/// Draws a rectangle outline.
pub fn draw_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>, thickness: u32) {
    let (img_w, img_h) = img.dimensions();
    let mut put = |px: u32, py: u32| {
        if px < img_w && py < img_h {
            img.put_pixel(px, py, color);
        }
    };

    for t in 0..thickness {
        for dx in 0..w {
            put(x + dx, y + t);
            put(x + dx, y + h.saturating_sub(1).saturating_sub(t));
        }
        for dy in 0..h {
            put(x + t, y + dy);
            put(x + w.saturating_sub(1).saturating_sub(t), y + dy);
        }
    }
}

/// Full-width line at row `y`.
pub fn draw_hline(img: &mut RgbImage, y: u32, color: Rgb<u8>) {
    if y >= img.height() {
        return;
    }
    for x in 0..img.width() {
        img.put_pixel(x, y, color);
    }
}

/// Full-height line at column `x`.
pub fn draw_vline(img: &mut RgbImage, x: u32, color: Rgb<u8>) {
    if x >= img.width() {
        return;
    }
    for y in 0..img.height() {
        img.put_pixel(x, y, color);
    }
}

/// Draws a small crosshair centred on `(x, y)`.
pub fn draw_crosshair(img: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>, arm_length: u32) {
    let (img_w, img_h) = img.dimensions();
    let arm = arm_length as i64;

    for d in -arm..=arm {
        let px = x as i64 + d;
        if (0..img_w as i64).contains(&px) && y < img_h {
            img.put_pixel(px as u32, y, color);
        }
        let py = y as i64 + d;
        if (0..img_h as i64).contains(&py) && x < img_w {
            img.put_pixel(x, py as u32, color);
        }
    }
}

/// Region copy with plot area, grid and trace drawn on top.
pub fn render_overlay(
    region: &RgbImage,
    bounds: &PlotBounds,
    grid: &GridLines,
    points: &[PixelPoint],
) -> RgbImage {
    let mut img = region.clone();

    draw_rect(
        &mut img,
        bounds.left,
        bounds.top,
        bounds.right - bounds.left + 1,
        bounds.bottom - bounds.top + 1,
        PLOT_AREA_COLOR,
        1,
    );
    for &y in &grid.horizontal {
        draw_hline(&mut img, y, GRID_COLOR);
    }
    for &x in &grid.vertical {
        draw_vline(&mut img, x, GRID_COLOR);
    }
    for p in points {
        draw_crosshair(&mut img, p.x, p.y, TRACE_COLOR, 3);
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_rect() {
        let mut img = RgbImage::new(100, 100);
        let color = Rgb([255, 0, 0]);
        draw_rect(&mut img, 10, 10, 20, 20, color, 2);

        // Check corners and edges are drawn
        assert_eq!(*img.get_pixel(10, 10), color);
        assert_eq!(*img.get_pixel(29, 10), color);
        assert_eq!(*img.get_pixel(10, 29), color);
        assert_eq!(*img.get_pixel(29, 29), color);
        assert_eq!(*img.get_pixel(11, 20), color);

        // Check interior is not drawn
        assert_eq!(*img.get_pixel(20, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_crosshair_clips_at_edges() {
        let mut img = RgbImage::new(10, 10);
        let color = Rgb([0, 255, 0]);
        draw_crosshair(&mut img, 0, 0, color, 3);

        assert_eq!(*img.get_pixel(0, 0), color);
        assert_eq!(*img.get_pixel(3, 0), color);
        assert_eq!(*img.get_pixel(0, 3), color);
        assert_eq!(*img.get_pixel(4, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_overlay_marks_grid_and_trace() {
        let region = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
        let bounds = PlotBounds::new(&crate::vision::CropRegion::FULL, 50, 50);
        let grid = GridLines {
            horizontal: vec![10, 40],
            vertical: vec![25],
        };
        let overlay = render_overlay(&region, &bounds, &grid, &[PixelPoint { x: 5, y: 20 }]);

        assert_eq!(*overlay.get_pixel(20, 10), GRID_COLOR);
        assert_eq!(*overlay.get_pixel(25, 30), GRID_COLOR);
        assert_eq!(*overlay.get_pixel(5, 20), TRACE_COLOR);
        assert_eq!(*overlay.get_pixel(0, 0), PLOT_AREA_COLOR);
        // The source region is left untouched
        assert_eq!(*region.get_pixel(20, 10), Rgb([255, 255, 255]));
    }
}
