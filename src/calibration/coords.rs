//! Pixel to data-space conversion.
//!
//! Both axes are linear between the outermost detected grid lines. With
//! fewer than two lines, or two that coincide, the region's own pixel extent
//! stands in.

use std::collections::BTreeMap;

use super::DataPoint;
use crate::config::AxisRange;
use crate::grid::GridLines;
use crate::trace::PixelPoint;

/// Pixel positions that correspond to an axis's low and high ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisAnchors {
    pub low: f64,
    pub high: f64,
}

impl AxisAnchors {
    /// Uses the first and last line, or `0..extent-1` when that degenerates.
    pub fn from_lines(lines: &[u32], extent: u32) -> Self {
        if let (Some(&first), Some(&last)) = (lines.first(), lines.last()) {
            if lines.len() >= 2 && first != last {
                return Self {
                    low: first as f64,
                    high: last as f64,
                };
            }
        }
        Self {
            low: 0.0,
            high: extent.saturating_sub(1) as f64,
        }
    }

    /// Position of `pixel` between `low` (0.0) and `high` (1.0).
    pub fn ratio(&self, pixel: f64) -> f64 {
        let span = self.high - self.low;
        if span == 0.0 {
            0.0
        } else {
            (pixel - self.low) / span
        }
    }
}

/// Per-point mapping without yearly aggregation.
pub fn map_points(
    points: &[PixelPoint],
    grid: &GridLines,
    dimensions: (u32, u32),
    axis: &AxisRange,
) -> Vec<DataPoint> {
    let (width, height) = dimensions;
    let columns = AxisAnchors::from_lines(&grid.vertical, width);
    // Rows grow downward: the top line carries value_max.
    let rows = AxisAnchors::from_lines(&grid.horizontal, height);

    points
        .iter()
        .map(|p| {
            let year_span = (axis.year_max - axis.year_min) as f64;
            let year = axis.year_min as f64 + columns.ratio(p.x as f64) * year_span;
            // max/min instead of clamp: an unvalidated inverted axis must not panic
            let year = (year.round() as i32).max(axis.year_min).min(axis.year_max);

            let up = 1.0 - rows.ratio(p.y as f64);
            let value = axis.value_min + up * (axis.value_max - axis.value_min);
            DataPoint::new(year, value.max(axis.value_min).min(axis.value_max))
        })
        .collect()
}

/// Averages values sharing a year. Output is strictly ascending by year.
pub fn aggregate_yearly(points: &[DataPoint]) -> Vec<DataPoint> {
    let mut years: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for p in points {
        let entry = years.entry(p.year).or_insert((0.0, 0));
        entry.0 += p.value;
        entry.1 += 1;
    }
    years
        .into_iter()
        .map(|(year, (sum, count))| DataPoint::new(year, sum / count as f64))
        .collect()
}

/// Maps a pixel trace onto the axis ranges, one point per year.
pub fn map_to_data(
    points: &[PixelPoint],
    grid: &GridLines,
    dimensions: (u32, u32),
    axis: &AxisRange,
) -> Vec<DataPoint> {
    let yearly = aggregate_yearly(&map_points(points, grid, dimensions, axis));
    log::debug!(
        "Mapped {} pixel points to {} yearly values",
        points.len(),
        yearly.len()
    );
    yearly
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(year_min: i32, year_max: i32, value_max: f64) -> AxisRange {
        AxisRange {
            year_min,
            year_max,
            value_min: 0.0,
            value_max,
        }
    }

    #[test]
    fn test_ratio_between_lines() {
        let anchors = AxisAnchors::from_lines(&[20, 60, 100], 200);
        assert_eq!(anchors.low, 20.0);
        assert_eq!(anchors.high, 100.0);
        assert_eq!(anchors.ratio(60.0), 0.5);
    }

    #[test]
    fn test_single_or_coincident_lines_fall_back_to_extent() {
        let fallback = AxisAnchors {
            low: 0.0,
            high: 199.0,
        };
        assert_eq!(AxisAnchors::from_lines(&[50], 200), fallback);
        assert_eq!(AxisAnchors::from_lines(&[80, 80], 200), fallback);
        assert_eq!(AxisAnchors::from_lines(&[], 200), fallback);
    }

    #[test]
    fn test_one_pixel_extent_does_not_divide_by_zero() {
        let anchors = AxisAnchors::from_lines(&[], 1);
        assert_eq!(anchors.ratio(0.0), 0.0);
    }

    #[test]
    fn test_rows_map_inverted() {
        let grid = GridLines {
            horizontal: vec![0, 100],
            vertical: vec![],
        };
        let points = [PixelPoint { x: 0, y: 0 }, PixelPoint { x: 100, y: 100 }];
        let mapped = map_points(&points, &grid, (101, 101), &axis(2000, 2010, 10.0));

        assert_eq!(mapped[0], DataPoint::new(2000, 10.0));
        assert_eq!(mapped[1], DataPoint::new(2010, 0.0));
    }

    #[test]
    fn test_values_and_years_are_clamped() {
        let grid = GridLines {
            horizontal: vec![50, 150],
            vertical: vec![50, 150],
        };
        let points = [PixelPoint { x: 0, y: 0 }, PixelPoint { x: 199, y: 199 }];
        let mapped = map_points(&points, &grid, (200, 200), &axis(2005, 2024, 12.0));

        assert_eq!(mapped[0], DataPoint::new(2005, 12.0));
        assert_eq!(mapped[1], DataPoint::new(2024, 0.0));
    }

    #[test]
    fn test_aggregate_averages_within_year() {
        let points = [
            DataPoint::new(2020, 2.0),
            DataPoint::new(2018, 1.0),
            DataPoint::new(2020, 4.0),
        ];
        assert_eq!(
            aggregate_yearly(&points),
            vec![DataPoint::new(2018, 1.0), DataPoint::new(2020, 3.0)]
        );
    }

    #[test]
    fn test_empty_input_maps_to_empty() {
        let mapped = map_to_data(&[], &GridLines::default(), (100, 100), &AxisRange::default());
        assert!(mapped.is_empty());
    }

    #[test]
    fn test_inverted_axis_maps_without_panicking() {
        let inverted = AxisRange {
            year_min: 2024,
            year_max: 2015,
            value_min: 9.0,
            value_max: 0.0,
        };
        let mapped = map_to_data(
            &[PixelPoint { x: 5, y: 5 }],
            &GridLines::default(),
            (10, 10),
            &inverted,
        );
        assert_eq!(mapped.len(), 1);
    }
}
