//! Debug artifacts for tuning the vision heuristics.
//!
//! Not part of the data contract; written only when `output.debug` is set.

pub mod overlay;

use anyhow::{Context, Result};
use image::{GrayImage, RgbImage};
use std::path::{Path, PathBuf};

pub use overlay::render_overlay;

/// Intermediate images captured during one extraction.
#[derive(Clone, Debug)]
pub struct DebugCapture {
    /// Cropped chart area
    pub region: RgbImage,
    /// Winning trend-line mask, if any range matched
    pub trend_mask: Option<GrayImage>,
    /// Horizontal and vertical grey grid masks
    pub grid_masks: (GrayImage, GrayImage),
    /// Region with plot area, grid and trace drawn on
    pub overlay: RgbImage,
}

/// Saves all captured images for `slug` and returns the written paths.
///
/// Layout: `<debug_dir>/<slug>_chart_area.png`, `<slug>_overlay.png`, and
/// masks under `<debug_dir>/masks/`.
pub fn save_debug_images(debug_dir: &Path, slug: &str, capture: &DebugCapture) -> Result<Vec<PathBuf>> {
    let masks_dir = debug_dir.join("masks");
    std::fs::create_dir_all(&masks_dir)
        .with_context(|| format!("Failed to create {}", masks_dir.display()))?;

    let mut written = Vec::new();

    let path = debug_dir.join(format!("{slug}_chart_area.png"));
    capture.region.save(&path)?;
    written.push(path);

    let path = debug_dir.join(format!("{slug}_overlay.png"));
    capture.overlay.save(&path)?;
    written.push(path);

    if let Some(mask) = &capture.trend_mask {
        let path = masks_dir.join(format!("{slug}_trend_mask.png"));
        mask.save(&path)?;
        written.push(path);
    }

    let (horizontal, vertical) = &capture.grid_masks;
    for (name, mask) in [("grid_horizontal", horizontal), ("grid_vertical", vertical)] {
        let path = masks_dir.join(format!("{slug}_{name}.png"));
        mask.save(&path)?;
        written.push(path);
    }

    log::debug!("Debug images saved to {}", debug_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_debug_images() {
        let dir = tempdir().unwrap();
        let capture = DebugCapture {
            region: RgbImage::new(4, 4),
            trend_mask: None,
            grid_masks: (GrayImage::new(4, 4), GrayImage::new(4, 4)),
            overlay: RgbImage::new(4, 4),
        };

        let written = save_debug_images(dir.path(), "rust", &capture).unwrap();
        assert_eq!(written.len(), 4);
        assert!(dir.path().join("masks/rust_grid_vertical.png").exists());
        assert!(written.iter().all(|p| p.exists()));
    }
}
