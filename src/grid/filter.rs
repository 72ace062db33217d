//! Post-processing of raw line candidates: merge, restrict, resample.

use crate::analysis::statistics::{median, sorted};

/// Collapses runs of candidates closer than `tolerance` into their mean.
///
/// Input must be ascending. Output is strictly increasing.
pub fn merge_nearby(candidates: &[u32], tolerance: u32) -> Vec<u32> {
    let mut merged = Vec::new();
    let mut cluster: Vec<u32> = Vec::new();

    for &c in candidates {
        if let Some(&last) = cluster.last() {
            if c.saturating_sub(last) > tolerance {
                merged.push(cluster_center(&cluster));
                cluster.clear();
            }
        }
        cluster.push(c);
    }
    if !cluster.is_empty() {
        merged.push(cluster_center(&cluster));
    }

    merged.dedup();
    merged
}

fn cluster_center(cluster: &[u32]) -> u32 {
    let sum: u64 = cluster.iter().map(|&v| v as u64).sum();
    (sum as f64 / cluster.len() as f64).round() as u32
}

/// Keeps lines within `[lo, hi]`.
pub fn restrict(lines: &[u32], lo: u32, hi: u32) -> Vec<u32> {
    lines
        .iter()
        .copied()
        .filter(|&v| lo <= v && v <= hi)
        .collect()
}

/// Thins an over-detected line set down to `expected` evenly spaced lines.
///
/// First drops lines closer to their predecessor than 70% of the median
/// spacing, then, if still too many, picks evenly by index. The first and
/// last lines always survive so the outer anchors stay intact.
pub fn resample_even(lines: &[u32], expected: usize) -> Vec<u32> {
    if expected < 2 || lines.len() <= expected {
        return lines.to_vec();
    }

    let spacings = sorted(lines.windows(2).map(|w| (w[1] - w[0]) as f64));
    let step = median(&spacings);

    let mut kept = vec![lines[0]];
    for &line in &lines[1..] {
        if let Some(&last) = kept.last() {
            if (line - last) as f64 >= step * 0.7 {
                kept.push(line);
            }
        }
    }
    let last = lines[lines.len() - 1];
    if kept.last() != Some(&last) {
        if kept.len() > 1 && ((last - kept[kept.len() - 1]) as f64) < step * 0.7 {
            kept.pop();
        }
        kept.push(last);
    }

    if kept.len() <= expected {
        return kept;
    }

    let n = kept.len();
    let mut picked: Vec<u32> = (0..expected)
        .map(|i| {
            let idx = (i as f64 * (n - 1) as f64 / (expected - 1) as f64).round() as usize;
            kept[idx.min(n - 1)]
        })
        .collect();
    picked.dedup();
    picked
}

/// Full candidate clean-up: merge, restrict to the plot band, resample.
pub fn finalize(candidates: &[u32], tolerance: u32, lo: u32, hi: u32, expected: usize) -> Vec<u32> {
    let merged = merge_nearby(candidates, tolerance);
    let inside = restrict(&merged, lo, hi);
    resample_even(&inside, expected)
}
