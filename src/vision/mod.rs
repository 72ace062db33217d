//! Pixel-level building blocks shared by grid detection and trace extraction.
//!
//! - colour space conversion and range masks (`hsv`)
//! - rectangular kernels for `imageproc` opening and closing (`morphology`)
//! - grayscale and Sobel gradients (`edges`)
//! - plot-region cropping (`preprocess`)

pub mod edges;
pub mod hsv;
pub mod morphology;
pub mod preprocess;

pub use hsv::{count_nonzero, in_range, to_hsv, HsvImage, HsvRange};
pub use morphology::Kernel;
pub use preprocess::{crop_region, CropProfile, CropRegion};
