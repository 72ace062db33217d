//! Error taxonomy for the chart recovery core.
//!
//! An empty extraction is not an error; see [`crate::pipeline::EmptyReason`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    /// Image bytes could not be decoded. Fatal for that chart only.
    #[error("failed to decode chart image from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: image::ImageError,
    },

    /// Crop margins are misconfigured. Raised at config validation time.
    #[error("invalid crop region: {0}")]
    InvalidRegion(String),

    /// Axis range does not increase on one of its axes.
    #[error("invalid axis range: {0}")]
    InvalidAxis(String),

    /// Anchor file exists but could not be parsed.
    #[error("invalid calibration anchors in {path}: {reason}")]
    Anchors { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChartError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ChartError> = std::result::Result<T, E>;
