//! Styling for recovered-series charts.
//!
//! Lives under `output.chart` in the pipeline config; every field has a
//! default so the section can be omitted.

use serde::{Deserialize, Serialize};

/// Chart styling with all customizable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Font sizes
    pub font: FontConfig,
    /// Colors (RGB values)
    pub colors: ColorConfig,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Caption font size
    pub title_size: u32,
    /// Axis label font size
    pub axis_label_size: u32,
    /// Legend font size
    pub legend_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Series as read off the image [R, G, B]
    pub raw_line: [u8; 3],
    /// Series after anchor correction [R, G, B]
    pub calibrated_line: [u8; 3],
    /// Anchor markers [R, G, B]
    pub anchor: [u8; 3],
    /// Mesh lines [R, G, B]
    pub grid_color: [u8; 3],
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font: FontConfig::default(),
            colors: ColorConfig::default(),
            width: 900,
            height: 540,
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            title_size: 28,
            axis_label_size: 14,
            legend_size: 14,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            raw_line: [243, 156, 18],        // #F39C12
            calibrated_line: [41, 128, 185], // #2980B9
            anchor: [192, 57, 43],           // #C0392B
            grid_color: [220, 220, 220],
        }
    }
}
