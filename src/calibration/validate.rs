//! Tolerance check of a series against anchors.

use serde::{Deserialize, Serialize};

use super::{value_at, CalibrationAnchor, DataPoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorOutcome {
    /// Within tolerance
    Pass,
    /// Outside tolerance
    Miss,
    /// Series has no value for the anchor year
    Absent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorCheck {
    pub year: i32,
    pub expected: f64,
    pub actual: Option<f64>,
    pub outcome: AnchorOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Pass,
    NeedsWork,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub tolerance: f64,
    pub checks: Vec<AnchorCheck>,
    /// Largest absolute deviation over anchors present in the series
    pub max_deviation: Option<f64>,
    pub status: ValidationStatus,
}

impl ValidationReport {
    pub fn passed(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.outcome == AnchorOutcome::Pass)
            .count()
    }
}

/// Compares `series` with each anchor. Overall status is `Pass` only when
/// every anchor passes.
pub fn validate_series(
    series: &[DataPoint],
    anchors: &[CalibrationAnchor],
    tolerance: f64,
) -> ValidationReport {
    let checks: Vec<AnchorCheck> = anchors
        .iter()
        .map(|anchor| {
            let actual = value_at(series, anchor.year);
            let outcome = match actual {
                Some(v) if (v - anchor.value).abs() <= tolerance => AnchorOutcome::Pass,
                Some(_) => AnchorOutcome::Miss,
                None => AnchorOutcome::Absent,
            };
            AnchorCheck {
                year: anchor.year,
                expected: anchor.value,
                actual,
                outcome,
            }
        })
        .collect();

    let max_deviation = checks
        .iter()
        .filter_map(|c| c.actual.map(|v| (v - c.expected).abs()))
        .reduce(f64::max);

    let status = if checks.iter().all(|c| c.outcome == AnchorOutcome::Pass) {
        ValidationStatus::Pass
    } else {
        ValidationStatus::NeedsWork
    };

    for check in &checks {
        match check.actual {
            Some(v) => log::debug!(
                "{}: expected {:.1}, got {:.2} [{:?}]",
                check.year,
                check.expected,
                v,
                check.outcome
            ),
            None => log::debug!("{}: expected {:.1}, no data", check.year, check.expected),
        }
    }

    ValidationReport {
        tolerance,
        checks,
        max_deviation,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_outcomes_need_work() {
        let series = vec![DataPoint::new(2017, 1.2), DataPoint::new(2019, 4.5)];
        let anchors = vec![
            CalibrationAnchor::new(2017, 0.9),
            CalibrationAnchor::new(2019, 3.4),
            CalibrationAnchor::new(2023, 8.0),
        ];
        let report = validate_series(&series, &anchors, 0.5);

        let outcomes: Vec<AnchorOutcome> = report.checks.iter().map(|c| c.outcome).collect();
        assert_eq!(
            outcomes,
            vec![AnchorOutcome::Pass, AnchorOutcome::Miss, AnchorOutcome::Absent]
        );
        assert_eq!(report.status, ValidationStatus::NeedsWork);
        assert_eq!(report.passed(), 1);
        assert!((report.max_deviation.unwrap() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_all_within_tolerance_passes() {
        let series = vec![DataPoint::new(2017, 0.9)];
        let report = validate_series(&series, &[CalibrationAnchor::new(2017, 1.3)], 0.5);
        assert_eq!(report.status, ValidationStatus::Pass);
    }

    #[test]
    fn test_status_serializes_in_caps() {
        let json = serde_json::to_string(&ValidationStatus::NeedsWork).unwrap();
        assert_eq!(json, "\"NEEDS_WORK\"");
    }
}
