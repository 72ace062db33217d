//! Series summaries and job-count conversion.

use serde::{Deserialize, Serialize};

use super::statistics;
use crate::calibration::DataPoint;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub years: usize,
    pub first: DataPoint,
    pub last: DataPoint,
    /// Highest value; the earliest year wins ties
    pub peak: DataPoint,
    pub mean: f64,
    pub median: f64,
    /// `last - first`
    pub change: f64,
}

impl SeriesSummary {
    /// `None` for an empty series.
    pub fn from_series(series: &[DataPoint]) -> Option<Self> {
        let first = *series.first()?;
        let last = *series.last()?;
        let peak = series
            .iter()
            .copied()
            .reduce(|best, p| if p.value > best.value { p } else { best })?;

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let sorted = statistics::sorted(values.iter().copied());

        Some(Self {
            years: series.len(),
            first,
            last,
            peak,
            mean: statistics::mean(&values),
            median: statistics::median(&sorted),
            change: last.value - first.value,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobCount {
    pub year: i32,
    pub percentage: f64,
    pub jobs: u64,
}

/// Converts percentage-of-market values to job counts.
pub fn job_counts(series: &[DataPoint], market_size: u32) -> Vec<JobCount> {
    series
        .iter()
        .map(|p| JobCount {
            year: p.year,
            percentage: p.value,
            jobs: (p.value / 100.0 * market_size as f64).round().max(0.0) as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKET_SIZE: u32 = 50_000;

    fn series() -> Vec<DataPoint> {
        vec![
            DataPoint::new(2017, 1.0),
            DataPoint::new(2018, 4.0),
            DataPoint::new(2019, 4.0),
            DataPoint::new(2020, 3.0),
        ]
    }

    #[test]
    fn test_summary() {
        let summary = SeriesSummary::from_series(&series()).unwrap();
        assert_eq!(summary.years, 4);
        assert_eq!(summary.first.year, 2017);
        assert_eq!(summary.last.year, 2020);
        assert_eq!(summary.peak, DataPoint::new(2018, 4.0));
        assert_eq!(summary.mean, 3.0);
        assert_eq!(summary.median, 3.5);
        assert_eq!(summary.change, 2.0);
    }

    #[test]
    fn test_empty_series_has_no_summary() {
        assert!(SeriesSummary::from_series(&[]).is_none());
    }

    #[test]
    fn test_job_counts() {
        let counts = job_counts(&[DataPoint::new(2023, 8.0), DataPoint::new(2017, 0.9)], MARKET_SIZE);
        assert_eq!(counts[0].jobs, 4000);
        assert_eq!(counts[1].jobs, 450);
    }
}
