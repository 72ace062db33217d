//! Chart image decoding.

use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::Path;

use crate::error::{ChartError, Result};

/// A decoded chart. Alpha, if any, is dropped.
pub type ChartImage = RgbImage;

/// Decodes an in-memory WEBP/PNG (or any format `image` recognises).
///
/// `origin` only labels errors and log lines.
pub fn decode_chart(bytes: &[u8], origin: &str) -> Result<ChartImage> {
    let img = image::load_from_memory(bytes).map_err(|source| ChartError::Decode {
        origin: origin.to_string(),
        source,
    })?;
    let rgb = img.to_rgb8();
    log::debug!("Decoded {}: {}x{}", origin, rgb.width(), rgb.height());
    Ok(rgb)
}

/// Reads and decodes a chart from disk.
pub fn load_chart(path: &Path) -> Result<ChartImage> {
    let bytes = fs::read(path).map_err(|e| ChartError::io(path, e))?;
    let img = decode_chart(&bytes, &path.display().to_string())?;
    log::info!(
        "Loaded chart image {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Writes a PNG copy of the decoded chart for inspection.
///
/// Best effort: failures are logged and reported as `false`.
pub fn cache_png(img: &ChartImage, target: &Path) -> bool {
    if let Some(parent) = target.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("Could not create {}: {}", parent.display(), e);
            return false;
        }
    }
    match img.save_with_format(target, ImageFormat::Png) {
        Ok(()) => {
            log::debug!("Converted copy saved: {}", target.display());
            true
        }
        Err(e) => {
            log::warn!("Failed to cache PNG {}: {}", target.display(), e);
            false
        }
    }
}
