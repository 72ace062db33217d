//! JSON export of recovered series and batch summaries.

use crate::calibration::DataPoint;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export any serializable value to a JSON file.
///
/// The output is pretty-printed for human readability.
pub fn export_to_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create JSON file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}

/// Writes a series as a JSON array of `{year, value}` objects.
pub fn write_series(series: &[DataPoint], output_path: &Path) -> Result<()> {
    export_to_json(series, output_path)
}
