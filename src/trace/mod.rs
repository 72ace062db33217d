//! Trend line extraction.
//!
//! Segments the plotted series by colour, drops speckle, and collapses the
//! line's thickness to one y per x-column.

use std::collections::BTreeMap;

use image::{GrayImage, Luma, RgbImage};
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::{Deserialize, Serialize};

use crate::config::TrendConfig;
use crate::vision::morphology::{self, Kernel};
use crate::vision::{count_nonzero, in_range, to_hsv, HsvImage, HsvRange};

/// A point in cropped-region pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

/// Close then open with a small square kernel.
///
/// An opening that would wipe out the whole mask (a 1px line under a 2px
/// kernel) is skipped and the closed mask is kept.
fn clean(mask: &GrayImage, size: u32) -> GrayImage {
    if size <= 1 {
        return mask.clone();
    }
    let kernel = Kernel::square(size);
    let closed = morphology::close(mask, kernel);
    let opened = morphology::open(&closed, kernel);
    if count_nonzero(&opened) == 0 {
        closed
    } else {
        opened
    }
}

/// Best cleaned mask across the candidate ranges, or `None` if every range
/// comes up empty.
pub fn best_trend_mask(hsv: &HsvImage, ranges: &[HsvRange], cleanup_kernel: u32) -> Option<GrayImage> {
    let mut best: Option<(usize, GrayImage)> = None;

    for (i, range) in ranges.iter().enumerate() {
        let mask = clean(&in_range(hsv, range), cleanup_kernel);
        let pixel_count = count_nonzero(&mask);
        log::debug!("Trend range {}: {} pixels", i + 1, pixel_count);

        if pixel_count > best.as_ref().map_or(0, |(count, _)| *count) {
            best = Some((pixel_count, mask));
        }
    }

    best.map(|(_, mask)| mask)
}

/// Pixels of the 8-connected blobs larger than `min_area`.
pub fn large_component_pixels(mask: &GrayImage, min_area: usize) -> Vec<(u32, u32)> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let label_count = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;

    let mut areas = vec![0usize; label_count + 1];
    for p in labels.pixels() {
        areas[p[0] as usize] += 1;
    }

    labels
        .enumerate_pixels()
        .filter(|(_, _, label)| label[0] != 0 && areas[label[0] as usize] > min_area)
        .map(|(x, y, _)| (x, y))
        .collect()
}

/// Averages the y-values sharing each x-column. Output is ordered by x.
pub fn average_columns(pixels: impl IntoIterator<Item = (u32, u32)>) -> Vec<PixelPoint> {
    let mut columns: BTreeMap<u32, (u64, u64)> = BTreeMap::new();
    for (x, y) in pixels {
        let entry = columns.entry(x).or_insert((0, 0));
        entry.0 += y as u64;
        entry.1 += 1;
    }

    columns
        .into_iter()
        .map(|(x, (sum, count))| PixelPoint {
            x,
            y: (sum as f64 / count as f64).round() as u32,
        })
        .collect()
}

/// Takes every n-th point when there are more than `cap`.
pub fn subsample(points: Vec<PixelPoint>, cap: usize) -> Vec<PixelPoint> {
    let cap = cap.max(1);
    if points.len() <= cap {
        return points;
    }
    let step = points.len() / cap;
    points.into_iter().step_by(step.max(1)).collect()
}

/// Trace and the mask it was read from.
#[derive(Clone, Debug)]
pub struct TrendTrace {
    pub points: Vec<PixelPoint>,
    pub mask: Option<GrayImage>,
}

/// Like [`extract_trend_line`], keeping the winning mask for debug output.
pub fn trace_trend(region: &RgbImage, config: &TrendConfig) -> TrendTrace {
    let hsv = to_hsv(region);
    let Some(mask) = best_trend_mask(&hsv, &config.color.ranges(), config.cleanup_kernel) else {
        log::info!("No {} line detected with any colour range", config.color.name());
        return TrendTrace {
            points: Vec::new(),
            mask: None,
        };
    };

    let pixels = large_component_pixels(&mask, config.min_component_area);

    if pixels.is_empty() {
        log::info!("No trend components above {} px", config.min_component_area);
        return TrendTrace {
            points: Vec::new(),
            mask: Some(mask),
        };
    }

    let averaged = average_columns(pixels);
    let cap = (region.width() as f32 * config.density) as usize;
    let points = subsample(averaged, cap);
    log::info!("Extracted {} points from {} line", points.len(), config.color.name());

    TrendTrace {
        points,
        mask: Some(mask),
    }
}

/// Extracts the pixel trace of the configured series colour.
///
/// An empty result means nothing recoverable, not an error.
pub fn extract_trend_line(region: &RgbImage, config: &TrendConfig) -> Vec<PixelPoint> {
    trace_trend(region, config).points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineColor;
    use image::Rgb;

    const ORANGE: Rgb<u8> = Rgb([255, 140, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    /// Horizontal orange band `thickness` pixels tall centred on `y`.
    fn band(width: u32, height: u32, y: u32, thickness: u32) -> RgbImage {
        let half = thickness / 2;
        RgbImage::from_fn(width, height, |_, py| {
            if py + half >= y && py <= y + half {
                ORANGE
            } else {
                WHITE
            }
        })
    }

    #[test]
    fn test_average_columns_collapses_thickness() {
        let points = average_columns([(3, 10), (3, 12), (1, 5), (3, 11)]);
        assert_eq!(points, vec![PixelPoint { x: 1, y: 5 }, PixelPoint { x: 3, y: 11 }]);
    }

    #[test]
    fn test_subsample_caps_point_count() {
        let points: Vec<PixelPoint> = (0..200).map(|x| PixelPoint { x, y: 0 }).collect();
        let sampled = subsample(points, 20);
        assert_eq!(sampled.len(), 20);
        assert_eq!(sampled[1].x, 10);

        let few: Vec<PixelPoint> = (0..5).map(|x| PixelPoint { x, y: 0 }).collect();
        assert_eq!(subsample(few.clone(), 20), few);
    }

    #[test]
    fn test_extracts_flat_line() {
        let img = band(200, 100, 40, 3);
        let points = extract_trend_line(&img, &TrendConfig::default());

        assert!((18..=23).contains(&points.len()), "{} points", points.len());
        assert!(points.iter().all(|p| p.y.abs_diff(40) <= 1), "{:?}", points);
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn test_muted_orange_is_caught_by_a_wider_range() {
        let muted = Rgb([230, 176, 122]);
        let ranges = LineColor::Orange.ranges();
        let hsv_pixel = crate::vision::hsv::rgb_to_hsv(230, 176, 122);
        assert!(!ranges[0].contains(hsv_pixel));
        assert!(ranges[1].contains(hsv_pixel));

        // Saturated band at y=20, muted band at y=60
        let mut img = band(100, 80, 20, 3);
        for x in 0..100 {
            for y in 59..=61 {
                img.put_pixel(x, y, muted);
            }
        }
        let hsv = to_hsv(&img);
        let mask = best_trend_mask(&hsv, &ranges, 1).unwrap();

        assert_eq!(count_nonzero(&mask), 600);
        assert!(mask.get_pixel(50, 60)[0] > 0);
    }

    #[test]
    fn test_large_component_pixels_uses_eight_connectivity() {
        let mut mask = GrayImage::new(20, 20);
        // 12px diagonal, connected only through corners
        for i in 0..12 {
            mask.put_pixel(i, i, Luma([255]));
        }
        // 4px blob
        for (x, y) in [(15, 2), (16, 2), (15, 3), (16, 3)] {
            mask.put_pixel(x, y, Luma([255]));
        }

        let kept = large_component_pixels(&mask, 10);
        assert_eq!(kept.len(), 12);
        assert!(kept.iter().all(|&(x, y)| x == y));
        assert!(large_component_pixels(&mask, 12).is_empty());
    }

    #[test]
    fn test_no_matching_colour_is_empty() {
        let img = RgbImage::from_pixel(100, 100, WHITE);
        let trace = trace_trend(&img, &TrendConfig::default());
        assert!(trace.points.is_empty());
        assert!(trace.mask.is_none());
    }

    #[test]
    fn test_speckle_below_area_threshold_is_dropped() {
        let mut img = RgbImage::from_pixel(100, 100, WHITE);
        for (x, y) in [(10, 10), (11, 10), (10, 11), (11, 11)] {
            img.put_pixel(x, y, ORANGE);
        }
        assert!(extract_trend_line(&img, &TrendConfig::default()).is_empty());
    }

    #[test]
    fn test_blue_preset_ignores_orange() {
        let img = band(100, 50, 20, 3);
        let config = TrendConfig {
            color: LineColor::Blue,
            ..Default::default()
        };
        assert!(extract_trend_line(&img, &config).is_empty());
    }
}
