//! Hue/saturation/value conversion and range masking.
//!
//! Uses the 8-bit convention common to chart tooling: hue in `0..=180`
//! (degrees halved), saturation and value in `0..=255`.

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// An image whose three channels hold H, S, V instead of R, G, B.
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Mask value for pixels that matched.
pub const MASK_ON: u8 = 255;

/// Inclusive HSV bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    /// Lower bound [H, S, V]
    pub lower: [u8; 3],
    /// Upper bound [H, S, V]
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// Converts one RGB triple to HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = max - min;

    let s = if max == 0.0 { 0.0 } else { 255.0 * diff / max };

    let h = if diff == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / diff
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [
        ((h / 2.0).round() as u32).min(180) as u8,
        s.round().min(255.0) as u8,
        max as u8,
    ]
}

/// Converts a whole image to HSV.
pub fn to_hsv(img: &RgbImage) -> HsvImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        Rgb(rgb_to_hsv(p[0], p[1], p[2]))
    })
}

/// Builds a binary mask of pixels inside `range`.
pub fn in_range(hsv: &HsvImage, range: &HsvRange) -> GrayImage {
    ImageBuffer::from_fn(hsv.width(), hsv.height(), |x, y| {
        let p = hsv.get_pixel(x, y);
        if range.contains(p.0) {
            Luma([MASK_ON])
        } else {
            Luma([0])
        }
    })
}

pub fn count_nonzero(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
    }

    #[test]
    fn test_grey_has_no_saturation() {
        let hsv = rgb_to_hsv(200, 200, 200);
        assert_eq!(hsv, [0, 0, 200]);
    }

    #[test]
    fn test_orange_hue() {
        // #FFA500 sits around 19 on the halved-degree scale
        let hsv = rgb_to_hsv(255, 165, 0);
        assert!((18..=20).contains(&hsv[0]), "hue was {}", hsv[0]);
        assert_eq!(hsv[1], 255);
        assert_eq!(hsv[2], 255);
    }

    #[test]
    fn test_in_range_mask() {
        let mut img = RgbImage::from_pixel(4, 1, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([255, 140, 0]));
        img.put_pixel(2, 0, Rgb([0, 0, 255]));

        let range = HsvRange::new([8, 150, 150], [25, 255, 255]);
        let mask = in_range(&to_hsv(&img), &range);

        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(1, 0)[0], MASK_ON);
        assert_eq!(mask.get_pixel(2, 0)[0], 0);
        assert_eq!(count_nonzero(&mask), 1);
    }
}
