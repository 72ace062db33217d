//! Anchor-based correction of a recovered series.
//!
//! This is an empirical smoothing step, not a statistical model. Anchor
//! years take the anchor value outright. Every other year is scaled by a
//! factor interpolated linearly between the factors at the surrounding
//! anchors (`anchor / raw`), and held flat before the first and after the
//! last anchor.

use super::{value_at, CalibrationAnchor, DataPoint};

/// Scale factor observed at one anchor year.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AnchorFactor {
    year: i32,
    factor: f64,
}

fn anchor_factors(raw: &[DataPoint], anchors: &[CalibrationAnchor]) -> Vec<AnchorFactor> {
    anchors
        .iter()
        .map(|anchor| {
            let factor = match value_at(raw, anchor.year) {
                Some(raw_value) if raw_value != 0.0 => anchor.value / raw_value,
                Some(_) => {
                    log::warn!("Raw value at anchor {} is zero; no scaling", anchor.year);
                    1.0
                }
                None => {
                    log::warn!(
                        "Anchor year {} absent from recovered series; skipping substitution",
                        anchor.year
                    );
                    1.0
                }
            };
            AnchorFactor {
                year: anchor.year,
                factor,
            }
        })
        .collect()
}

/// Factor for `year`; `factors` must be sorted by year and non-empty.
fn factor_for(factors: &[AnchorFactor], year: i32) -> f64 {
    let (Some(first), Some(last)) = (factors.first(), factors.last()) else {
        return 1.0;
    };
    if year <= first.year {
        return first.factor;
    }
    if year >= last.year {
        return last.factor;
    }

    let upper_idx = factors.partition_point(|f| f.year < year);
    let lower = factors[upper_idx - 1];
    let upper = factors[upper_idx];
    if upper.year == lower.year {
        return lower.factor;
    }
    let t = (year - lower.year) as f64 / (upper.year - lower.year) as f64;
    lower.factor + (upper.factor - lower.factor) * t
}

/// Corrects `raw` toward `anchors`. The year set is unchanged.
///
/// Anchors are expected sorted by year (see
/// [`normalize`](super::anchors::normalize)). With no anchors the series is
/// returned as is.
pub fn calibrate(raw: &[DataPoint], anchors: &[CalibrationAnchor]) -> Vec<DataPoint> {
    if anchors.is_empty() {
        return raw.to_vec();
    }

    let mut sorted = anchors.to_vec();
    sorted.sort_by_key(|a| a.year);
    let factors = anchor_factors(raw, &sorted);

    raw.iter()
        .map(|point| {
            if let Some(anchor) = sorted.iter().find(|a| a.year == point.year) {
                log::debug!(
                    "Direct calibration: {}: {:.2} -> {:.2}",
                    point.year,
                    point.value,
                    anchor.value
                );
                return DataPoint::new(point.year, anchor.value);
            }
            let factor = factor_for(&factors, point.year);
            DataPoint::new(point.year, point.value * factor)
        })
        .collect()
}
