//! Order statistics shared by grid filtering, edge thresholds and series
//! summaries.

/// Calculate median from sorted values.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 0 {
        // Even: average of two middle values
        let mid = n / 2;
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Calculate percentile using linear interpolation between closest ranks.
pub fn percentile(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }

    // Index in range [0, n-1]
    let index = (percentile.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lower_idx = index.floor() as usize;
    let upper_idx = index.ceil() as usize;

    if lower_idx == upper_idx {
        sorted[lower_idx]
    } else {
        let frac = index.fract();
        let lower = sorted[lower_idx];
        let upper = sorted[upper_idx];
        lower + (upper - lower) * frac
    }
}

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sorts a copy of `values` ascending. NaNs sort last.
pub fn sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd() {
        assert!((median(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_median_even() {
        assert!((median(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_quartiles() {
        // For [1, 2, 3, 4, 5]:
        // Q1: index = 0.25 * 4 = 1.0 -> 2
        // Q3: index = 0.75 * 4 = 3.0 -> 4
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&values, 25.0) - 2.0).abs() < 0.001);
        assert!((percentile(&values, 75.0) - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_percentile_interpolates() {
        // index = 0.95 * 3 = 2.85 -> 30 + 0.85 * 10
        let values = [10.0, 20.0, 30.0, 40.0];
        assert!((percentile(&values, 95.0) - 38.5).abs() < 0.001);
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sorted_handles_unordered_input() {
        assert_eq!(sorted([3.0, 1.0, 2.0]), vec![1.0, 2.0, 3.0]);
    }
}
