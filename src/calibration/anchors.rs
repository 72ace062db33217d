//! Anchor file loading.
//!
//! Accepted formats:
//! - JSON array: `[{"year": 2017, "value": 0.9}, ...]`
//! - JSON object: `{"2017": 0.9, "2019": 3.4}`
//! - CSV with a `year,value` header row

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::CalibrationAnchor;
use crate::error::{ChartError, Result};

/// Loads anchors from a `.json` or `.csv` file, sorted by year.
///
/// A later entry for the same year replaces an earlier one.
pub fn load_anchors(path: &Path) -> Result<Vec<CalibrationAnchor>> {
    let content = fs::read_to_string(path).map_err(|e| ChartError::io(path, e))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let anchors = match extension.as_deref() {
        Some("csv") => parse_csv(&content),
        Some("json") => parse_json(&content),
        other => Err(format!("unsupported anchor file type: {:?}", other)),
    }
    .map_err(|reason| ChartError::Anchors {
        path: path.to_path_buf(),
        reason,
    })?;

    log::info!("Loaded {} anchors from {}", anchors.len(), path.display());
    Ok(normalize(anchors))
}

/// Sorts by year, last entry per year wins.
pub fn normalize(anchors: Vec<CalibrationAnchor>) -> Vec<CalibrationAnchor> {
    let by_year: BTreeMap<i32, f64> = anchors.into_iter().map(|a| (a.year, a.value)).collect();
    by_year
        .into_iter()
        .map(|(year, value)| CalibrationAnchor::new(year, value))
        .collect()
}

fn parse_json(content: &str) -> std::result::Result<Vec<CalibrationAnchor>, String> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

    match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value::<Vec<CalibrationAnchor>>(value).map_err(|e| e.to_string())
        }
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(year, value)| {
                let year = year
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| format!("invalid year key {:?}", year))?;
                let value = value
                    .as_f64()
                    .ok_or_else(|| format!("value for {} is not a number", year))?;
                Ok(CalibrationAnchor::new(year, value))
            })
            .collect(),
        _ => Err("expected a JSON array or object".to_string()),
    }
}

/// Skips the header row and any malformed rows (with warning log).
fn parse_csv(content: &str) -> std::result::Result<Vec<CalibrationAnchor>, String> {
    let mut anchors = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        if line_num == 0 || line.trim().is_empty() {
            continue;
        }
        match parse_csv_line(line) {
            Some(anchor) => anchors.push(anchor),
            None => log::warn!("Skipping malformed anchor row {}: {:?}", line_num + 1, line),
        }
    }

    if anchors.is_empty() {
        return Err("no anchor rows".to_string());
    }
    Ok(anchors)
}

fn parse_csv_line(line: &str) -> Option<CalibrationAnchor> {
    let mut parts = line.split(',');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let value = parts.next()?.trim().parse::<f64>().ok()?;
    value
        .is_finite()
        .then(|| CalibrationAnchor::new(year, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn expected() -> Vec<CalibrationAnchor> {
        vec![
            CalibrationAnchor::new(2017, 0.9),
            CalibrationAnchor::new(2019, 3.4),
            CalibrationAnchor::new(2023, 8.0),
        ]
    }

    #[test]
    fn test_json_array() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "ai.json",
            r#"[{"year": 2023, "value": 8.0}, {"year": 2017, "value": 0.9}, {"year": 2019, "value": 3.4}]"#,
        );
        assert_eq!(load_anchors(&path).unwrap(), expected());
    }

    #[test]
    fn test_json_object() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "ai.json", r#"{"2017": 0.9, "2019": 3.4, "2023": 8}"#);
        assert_eq!(load_anchors(&path).unwrap(), expected());
    }

    #[test]
    fn test_csv_skips_header_and_bad_rows() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "ai.csv",
            "year,value\n2017,0.9\nnot,a row\n2019, 3.4\n\n2023,8.0\n",
        );
        assert_eq!(load_anchors(&path).unwrap(), expected());
    }

    #[test]
    fn test_duplicate_year_keeps_last() {
        let anchors = normalize(vec![
            CalibrationAnchor::new(2019, 1.0),
            CalibrationAnchor::new(2019, 3.4),
        ]);
        assert_eq!(anchors, vec![CalibrationAnchor::new(2019, 3.4)]);
    }

    #[test]
    fn test_malformed_json_is_anchor_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "ai.json", r#"{"twenty": 1.0}"#);
        assert!(matches!(load_anchors(&path), Err(ChartError::Anchors { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = load_anchors(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ChartError::Io { .. })));
    }
}
