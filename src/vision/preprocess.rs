//! Plot-region cropping.
//!
//! Regions are expressed as fractional edge positions of the *original*
//! image, so the same profile scales to any chart export size.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};

/// A sub-rectangle in relative coordinates (0.0 to 1.0).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Top edge (0.0 = top of image)
    pub top: f32,
    /// Bottom edge, must be greater than `top`
    pub bottom: f32,
    /// Left edge (0.0 = left of image)
    pub left: f32,
    /// Right edge, must be greater than `left`
    pub right: f32,
}

impl CropRegion {
    pub const FULL: CropRegion = CropRegion {
        top: 0.0,
        bottom: 1.0,
        left: 0.0,
        right: 1.0,
    };

    pub fn validate(&self) -> Result<()> {
        let edges = [self.top, self.bottom, self.left, self.right];
        if edges.iter().any(|e| !e.is_finite() || !(0.0..=1.0).contains(e)) {
            return Err(ChartError::InvalidRegion(format!(
                "edges must lie in [0, 1], got {:?}",
                self
            )));
        }
        if self.top >= self.bottom {
            return Err(ChartError::InvalidRegion(format!(
                "top ({}) must be less than bottom ({})",
                self.top, self.bottom
            )));
        }
        if self.left >= self.right {
            return Err(ChartError::InvalidRegion(format!(
                "left ({}) must be less than right ({})",
                self.left, self.right
            )));
        }
        Ok(())
    }

    /// Converts to absolute pixel bounds `(x0, y0, x1, y1)` (exclusive ends),
    /// clamped to the given dimensions.
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x0 = ((self.left * width as f32) as u32).min(width);
        let x1 = ((self.right * width as f32) as u32).clamp(x0, width);
        let y0 = ((self.top * height as f32) as u32).min(height);
        let y1 = ((self.bottom * height as f32) as u32).clamp(y0, height);
        (x0, y0, x1, y1)
    }
}

/// Named cropping strategies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "profile")]
pub enum CropProfile {
    /// Cuts 2-3% from each side, keeping axis labels inside the region.
    Minimal,
    /// Cuts title, legend and labels away. Can clip plotted data.
    Aggressive,
    Custom(CropRegion),
}

impl Default for CropProfile {
    fn default() -> Self {
        Self::Minimal
    }
}

impl CropProfile {
    pub fn region(&self) -> CropRegion {
        match self {
            CropProfile::Minimal => CropRegion {
                top: 0.03,
                bottom: 0.97,
                left: 0.02,
                right: 0.98,
            },
            CropProfile::Aggressive => CropRegion {
                top: 0.15,
                bottom: 0.80,
                left: 0.12,
                right: 0.90,
            },
            CropProfile::Custom(region) => *region,
        }
    }

    /// Estimated plotting sub-area inside the cropped region.
    ///
    /// The minimal profile still contains the title band and the axis label
    /// gutters; the others are assumed to already be plot-only.
    pub fn plot_area(&self) -> CropRegion {
        match self {
            CropProfile::Minimal => CropRegion {
                top: 0.10,
                bottom: 0.88,
                left: 0.08,
                right: 0.92,
            },
            CropProfile::Aggressive | CropProfile::Custom(_) => CropRegion::FULL,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CropProfile::Minimal => "minimal",
            CropProfile::Aggressive => "aggressive",
            CropProfile::Custom(_) => "custom",
        }
    }
}

/// Crops a region out of the chart image.
///
/// Fails with `InvalidRegion` on inverted or out-of-range edges.
pub fn crop_region(img: &RgbImage, region: &CropRegion) -> Result<RgbImage> {
    region.validate()?;
    let (x0, y0, x1, y1) = region.to_pixels(img.width(), img.height());
    Ok(image::imageops::crop_imm(img, x0, y0, x1 - x0, y1 - y0).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_crop_region() {
        // 100x200 image
        let img = RgbImage::from_fn(100, 200, |x, y| Rgb([x as u8, y as u8, 0]));

        let region = CropRegion {
            top: 0.25,
            bottom: 0.375,
            left: 0.125,
            right: 0.625,
        };
        let cropped = crop_region(&img, &region).unwrap();

        assert_eq!(cropped.dimensions(), (50, 25));
        // Top-left pixel should be (12, 50) from original
        assert_eq!(cropped.get_pixel(0, 0)[0], 12);
        assert_eq!(cropped.get_pixel(0, 0)[1], 50);
    }

    #[test]
    fn test_profiles_differ_in_extent() {
        let img = RgbImage::new(1000, 600);
        let minimal = crop_region(&img, &CropProfile::Minimal.region()).unwrap();
        let aggressive = crop_region(&img, &CropProfile::Aggressive.region()).unwrap();

        let (mw, mh) = minimal.dimensions();
        let (aw, ah) = aggressive.dimensions();
        assert!(mw > 950 && mh > 550, "minimal keeps most of the chart: {mw}x{mh}");
        assert!(aw < 800 && ah < 400, "aggressive trims margins: {aw}x{ah}");
    }

    #[test]
    fn test_inverted_region_is_rejected() {
        let img = RgbImage::new(10, 10);
        let region = CropRegion {
            top: 0.8,
            bottom: 0.2,
            left: 0.0,
            right: 1.0,
        };
        assert!(matches!(
            crop_region(&img, &region),
            Err(ChartError::InvalidRegion(_))
        ));

        let region = CropRegion {
            top: 0.0,
            bottom: 1.0,
            left: 0.5,
            right: 0.5,
        };
        assert!(region.validate().is_err());
    }

    #[test]
    fn test_out_of_range_edge_is_rejected() {
        let region = CropRegion {
            top: -0.1,
            bottom: 1.0,
            left: 0.0,
            right: 1.2,
        };
        assert!(region.validate().is_err());
    }

    #[test]
    fn test_profile_serde_roundtrip_names() {
        let json = serde_json::to_string(&CropProfile::Aggressive).unwrap();
        assert_eq!(json, r#"{"profile":"aggressive"}"#);
        let parsed: CropProfile = serde_json::from_str(r#"{"profile":"minimal"}"#).unwrap();
        assert_eq!(parsed, CropProfile::Minimal);
    }
}
