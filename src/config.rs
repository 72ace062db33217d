//! Per-chart pipeline configuration.
//!
//! Loaded from a JSON file; every field has a default so partial files work.
//! Axis ranges, crop margins and colour presets are chart-specific and live
//! here rather than in the algorithms.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::ChartStyle;
use crate::error::{ChartError, Result};
use crate::vision::{CropProfile, CropRegion, HsvRange};

/// Complete configuration for one pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// How the plot region is cut out of the full chart
    pub crop: CropProfile,
    pub grid: GridConfig,
    pub trend: TrendConfig,
    pub axis: AxisRange,
    pub calibration: CalibrationConfig,
    pub output: OutputConfig,
    /// Batch worker threads (0 = available parallelism)
    pub workers: usize,
}

/// Grid detection strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStrategy {
    /// Light-grey colour mask plus directional opening
    #[default]
    Color,
    /// Sobel edges plus run-length analysis
    Structure,
}

impl GridStrategy {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "color" | "colour" => Some(Self::Color),
            "structure" => Some(Self::Structure),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub strategy: GridStrategy,
    /// Plotting sub-area inside the cropped region. `None` derives it from
    /// the crop profile.
    pub plot_area: Option<CropRegion>,
    /// Candidates closer than this (pixels) collapse into one line
    pub merge_tolerance: u32,
    /// Horizontal lines on the value axis (13 for 0% through 12%)
    pub expected_horizontal: usize,
    /// Vertical lines on the year axis. `None` uses the axis year count.
    pub expected_vertical: Option<usize>,
    pub color: ColorGridConfig,
    pub structure: StructureGridConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            strategy: GridStrategy::Color,
            plot_area: None,
            merge_tolerance: 3,
            expected_horizontal: 13,
            expected_vertical: None,
            color: ColorGridConfig::default(),
            structure: StructureGridConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGridConfig {
    /// Candidate light-grey ranges; the one masking most pixels wins
    pub grey_ranges: Vec<HsvRange>,
    /// Length of the directional opening kernel in pixels
    pub kernel_length: u32,
    /// Minimum fraction of a row/column the mask must cover
    pub coverage: f32,
}

impl Default for ColorGridConfig {
    fn default() -> Self {
        Self {
            // Upper value bounds stay below pure white so the background
            // never masks as grid.
            grey_ranges: vec![
                HsvRange::new([0, 0, 100], [180, 60, 235]),
                HsvRange::new([0, 0, 120], [180, 50, 230]),
                HsvRange::new([0, 0, 140], [180, 40, 225]),
            ],
            kernel_length: 25,
            coverage: 0.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureGridConfig {
    /// Edge magnitudes above this percentile count as strong
    pub edge_percentile: f64,
    /// Minimum summed run length as a fraction of width (horizontal lines)
    pub min_horizontal_span: f32,
    /// Minimum summed run length as a fraction of height (vertical lines)
    pub min_vertical_span: f32,
    /// More disjoint runs than this means texture, not a line
    pub max_segments: usize,
}

impl Default for StructureGridConfig {
    fn default() -> Self {
        Self {
            edge_percentile: 95.0,
            min_horizontal_span: 0.4,
            min_vertical_span: 0.3,
            max_segments: 5,
        }
    }
}

/// Colour preset of the plotted series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineColor {
    /// Permanent jobs series
    #[default]
    Orange,
    /// Contract jobs series
    Blue,
    /// All-jobs series
    Gray,
    Custom { ranges: Vec<HsvRange> },
}

impl LineColor {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "orange" => Some(Self::Orange),
            "blue" => Some(Self::Blue),
            "gray" | "grey" => Some(Self::Gray),
            _ => None,
        }
    }

    /// Candidate HSV ranges, narrowest first.
    pub fn ranges(&self) -> Vec<HsvRange> {
        match self {
            LineColor::Orange => vec![
                HsvRange::new([8, 150, 150], [25, 255, 255]),
                HsvRange::new([5, 100, 100], [30, 255, 255]),
                HsvRange::new([3, 80, 80], [32, 255, 255]),
            ],
            LineColor::Blue => vec![
                HsvRange::new([100, 150, 100], [130, 255, 255]),
                HsvRange::new([95, 100, 80], [135, 255, 255]),
                HsvRange::new([90, 80, 60], [140, 255, 255]),
            ],
            LineColor::Gray => vec![
                HsvRange::new([0, 0, 100], [180, 50, 200]),
                HsvRange::new([0, 0, 90], [180, 60, 210]),
            ],
            LineColor::Custom { ranges } => ranges.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineColor::Orange => "orange",
            LineColor::Blue => "blue",
            LineColor::Gray => "gray",
            LineColor::Custom { .. } => "custom",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub color: LineColor,
    /// Square kernel for the close+open speckle cleanup
    pub cleanup_kernel: u32,
    /// Components with this many pixels or fewer are noise
    pub min_component_area: usize,
    /// Output is capped at this fraction of the region width
    pub density: f32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            color: LineColor::Orange,
            cleanup_kernel: 2,
            min_component_area: 10,
            density: 0.1,
        }
    }
}

/// Data-space extent of the chart axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisRange {
    pub year_min: i32,
    pub year_max: i32,
    pub value_min: f64,
    pub value_max: f64,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            year_min: 2005,
            year_max: 2024,
            value_min: 0.0,
            value_max: 12.0,
        }
    }
}

impl AxisRange {
    pub fn validate(&self) -> Result<()> {
        if self.year_min >= self.year_max {
            return Err(ChartError::InvalidAxis(format!(
                "year_min ({}) must be less than year_max ({})",
                self.year_min, self.year_max
            )));
        }
        if !(self.value_min.is_finite() && self.value_max.is_finite())
            || self.value_min >= self.value_max
        {
            return Err(ChartError::InvalidAxis(format!(
                "value_min ({}) must be less than value_max ({})",
                self.value_min, self.value_max
            )));
        }
        Ok(())
    }

    pub fn year_count(&self) -> usize {
        (self.year_max - self.year_min + 1).max(0) as usize
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Allowed deviation from an anchor before validation flags it
    pub tolerance: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { tolerance: 0.5 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write masks and overlays under `debug/`
    pub debug: bool,
    /// Keep a PNG copy of decoded WEBP sources under `converted/`
    pub cache_png: bool,
    /// Render a PNG chart of each recovered series under `charts/`
    pub render_charts: bool,
    /// Total market size used to derive job counts from percentages
    pub market_size: Option<u32>,
    pub chart: ChartStyle,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            debug: false,
            cache_png: true,
            render_charts: true,
            market_size: None,
            chart: ChartStyle::default(),
        }
    }
}

impl PipelineConfig {
    /// Load config from file, or return defaults if the file doesn't exist
    /// or can't be parsed.
    pub fn load(config_path: &Path) -> Self {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => {
                        log::info!("Loaded pipeline config from {}", config_path.display());
                        return config;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse pipeline config: {}. Using defaults.", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read pipeline config: {}. Using defaults.", e);
                }
            }
        } else {
            log::info!(
                "{} not found. Using default pipeline config.",
                config_path.display()
            );
        }
        Self::default()
    }

    /// Save default config to file (for reference).
    pub fn save_default(config_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&Self::default())
            .map_err(|e| ChartError::io(config_path, e.into()))?;
        fs::write(config_path, json).map_err(|e| ChartError::io(config_path, e))
    }

    /// Checks crop margins and axis ranges. Call once before processing.
    pub fn validate(&self) -> Result<()> {
        self.crop.region().validate()?;
        if let Some(area) = &self.grid.plot_area {
            area.validate()?;
        }
        self.axis.validate()
    }

    /// Plotting sub-area inside the cropped region.
    pub fn plot_area(&self) -> CropRegion {
        self.grid.plot_area.unwrap_or_else(|| self.crop.plot_area())
    }

    pub fn expected_vertical(&self) -> usize {
        self.grid
            .expected_vertical
            .unwrap_or_else(|| self.axis.year_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.crop, CropProfile::Minimal);
        assert_eq!(config.expected_vertical(), 20);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "axis": { "year_min": 2015, "year_max": 2024 },
            "grid": { "strategy": "structure" },
            "trend": { "color": "blue" }
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.axis.year_min, 2015);
        assert_eq!(config.axis.value_max, 12.0);
        assert_eq!(config.grid.strategy, GridStrategy::Structure);
        assert_eq!(config.grid.merge_tolerance, 3);
        assert_eq!(config.trend.color, LineColor::Blue);
        assert_eq!(config.expected_vertical(), 10);
    }

    #[test]
    fn test_custom_crop_from_json() {
        let json = r#"{ "crop": { "profile": "custom", "top": 0.1, "bottom": 0.9, "left": 0.05, "right": 0.95 } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.crop.region().left, 0.05);
        assert_eq!(config.plot_area(), CropRegion::FULL);
    }

    #[test]
    fn test_invalid_crop_fails_validation() {
        let config = PipelineConfig {
            crop: CropProfile::Custom(CropRegion {
                top: 0.5,
                bottom: 0.4,
                left: 0.0,
                right: 1.0,
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChartError::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_inverted_axis_fails_validation() {
        let mut config = PipelineConfig::default();
        config.axis.value_min = 12.0;
        config.axis.value_max = 0.0;
        assert!(matches!(config.validate(), Err(ChartError::InvalidAxis(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::load(&dir.path().join("nope.json"));
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        PipelineConfig::save_default(&path).unwrap();

        let loaded = PipelineConfig::load(&path);
        assert_eq!(loaded, PipelineConfig::default());
    }

    #[test]
    fn test_color_presets_have_ranges() {
        for name in ["orange", "blue", "gray"] {
            let color = LineColor::parse(name).unwrap();
            assert!(!color.ranges().is_empty());
            assert_eq!(color.name(), name);
        }
        assert!(LineColor::parse("purple").is_none());
    }

    #[test]
    fn test_color_ranges_widen_progressively() {
        for color in [LineColor::Orange, LineColor::Blue, LineColor::Gray] {
            let ranges = color.ranges();
            for pair in ranges.windows(2) {
                let (inner, outer) = (pair[0], pair[1]);
                for c in 0..3 {
                    assert!(
                        outer.lower[c] <= inner.lower[c] && outer.upper[c] >= inner.upper[c],
                        "{} range {:?} does not contain {:?}",
                        color.name(),
                        outer,
                        inner
                    );
                }
            }
        }
    }
}
