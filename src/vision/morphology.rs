//! Rectangular structuring elements for `imageproc` morphology.
//!
//! Masks are binary (0 / 255), so grayscale opening and closing act as their
//! binary counterparts. Pixels outside the image are ignored.

use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_close, grayscale_open, Mask};

/// Largest side `Mask::from_image` accepts.
const MAX_SIDE: u32 = 511;

/// Rectangular kernel size in pixels (width, height).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Kernel {
    pub width: u32,
    pub height: u32,
}

impl Kernel {
    pub const fn rect(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn square(size: u32) -> Self {
        Self::rect(size, size)
    }

    /// Filled mask anchored at `(width / 2, height / 2)`.
    pub fn mask(&self) -> Mask {
        let width = self.width.clamp(1, MAX_SIDE);
        let height = self.height.clamp(1, MAX_SIDE);
        let shape = GrayImage::from_pixel(width, height, Luma([255]));
        Mask::from_image(&shape, (width / 2) as u8, (height / 2) as u8)
    }
}

/// Erosion followed by dilation. Removes structures smaller than the kernel.
pub fn open(mask: &GrayImage, kernel: Kernel) -> GrayImage {
    grayscale_open(mask, &kernel.mask())
}

/// Dilation followed by erosion. Fills gaps smaller than the kernel.
pub fn close(mask: &GrayImage, kernel: Kernel) -> GrayImage {
    grayscale_close(mask, &kernel.mask())
}
