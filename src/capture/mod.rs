//! Chart image input.
//!
//! This module provides:
//! - Decoding from a file or byte buffer (`load_chart`, `decode_chart`)
//! - An optional PNG copy of the decoded source (`cache_png`)

pub mod loader;

pub use loader::{cache_png, decode_chart, load_chart, ChartImage};
