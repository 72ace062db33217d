//! Chart generation using plotters.
//!
//! One PNG per technology: the raw recovered series, the calibrated series
//! when anchors were supplied, and the anchor points themselves.

use super::config::ChartStyle;
use crate::calibration::{CalibrationAnchor, DataPoint};
use crate::config::AxisRange;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// Y range covering the axis range and anything plotted above it.
///
/// Calibrated values and anchors can exceed `value_max`; the top gets 5%
/// headroom so the highest point is not drawn on the frame.
pub fn value_bounds(
    axis: &AxisRange,
    series: &[&[DataPoint]],
    anchors: &[CalibrationAnchor],
) -> (f64, f64) {
    let highest = series
        .iter()
        .flat_map(|s| s.iter().map(|p| p.value))
        .chain(anchors.iter().map(|a| a.value))
        .fold(axis.value_max, f64::max);
    let lowest = series
        .iter()
        .flat_map(|s| s.iter().map(|p| p.value))
        .chain(anchors.iter().map(|a| a.value))
        .fold(axis.value_min, f64::min);
    let span = (highest - lowest).max(f64::EPSILON);
    (lowest, highest + span * 0.05)
}

/// Renders `raw` (and `calibrated`, if any) to a PNG at `output_path`.
pub fn render_series_chart(
    title: &str,
    raw: &[DataPoint],
    calibrated: Option<&[DataPoint]>,
    anchors: &[CalibrationAnchor],
    axis: &AxisRange,
    style: &ChartStyle,
    output_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)
        .context("Failed to fill chart background")?;

    let raw_color = rgb(style.colors.raw_line);
    let calibrated_color = rgb(style.colors.calibrated_line);
    let anchor_color = rgb(style.colors.anchor);
    let grid_color = rgb(style.colors.grid_color);

    let mut plotted: Vec<&[DataPoint]> = vec![raw];
    if let Some(c) = calibrated {
        plotted.push(c);
    }
    let (y_min, y_max) = value_bounds(axis, &plotted, anchors);
    let x_range = axis.year_min as f64 - 0.5..axis.year_max as f64 + 0.5;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", style.font.title_size))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_min..y_max)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("% of vacancies")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.1}", y))
        .label_style(("sans-serif", style.font.axis_label_size))
        .light_line_style(grid_color)
        .bold_line_style(grid_color.mix(0.8))
        .draw()
        .context("Failed to draw mesh")?;

    chart
        .draw_series(LineSeries::new(
            raw.iter().map(|p| (p.year as f64, p.value)),
            raw_color.stroke_width(2),
        ))?
        .label("Recovered")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], raw_color.stroke_width(2)));

    if let Some(calibrated) = calibrated {
        chart
            .draw_series(LineSeries::new(
                calibrated.iter().map(|p| (p.year as f64, p.value)),
                calibrated_color.stroke_width(2),
            ))?
            .label("Calibrated")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], calibrated_color.stroke_width(2))
            });
    }

    if !anchors.is_empty() {
        chart
            .draw_series(
                anchors
                    .iter()
                    .map(|a| Circle::new((a.year as f64, a.value), 5, anchor_color.filled())),
            )?
            .label("Anchors")
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, anchor_color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", style.font.legend_size))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .context("Failed to draw legend")?;

    root.present().context("Failed to save chart")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_bounds_default_to_axis() {
        let axis = AxisRange::default();
        let series = [DataPoint::new(2010, 3.0)];
        let (lo, hi) = value_bounds(&axis, &[&series[..]], &[]);
        assert_eq!(lo, 0.0);
        assert!((hi - 12.6).abs() < 1e-9);
    }

    #[test]
    fn test_value_bounds_stretch_for_anchors() {
        let axis = AxisRange::default();
        let (_, hi) = value_bounds(&axis, &[], &[CalibrationAnchor::new(2020, 20.0)]);
        assert!(hi > 20.0);
    }
}
