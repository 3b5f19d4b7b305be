//! Bound computation for the three outlier strategies.

use crate::config::OutlierMethod;
use crate::stats::sample;
use crate::types::{MethodDetails, OutlierBounds};

/// Compute outlier bounds over a numeric sample.
///
/// An empty sample yields bounds of 0/0 with zeroed method details.
pub fn compute_bounds(values: &[f64], method: OutlierMethod, threshold: f64) -> OutlierBounds {
    let (lower_bound, upper_bound, method_details) = if values.is_empty() {
        (0.0, 0.0, empty_details(method))
    } else {
        match method {
            OutlierMethod::ZScore => zscore_bounds(values, threshold),
            OutlierMethod::Iqr => iqr_bounds(values, threshold),
            OutlierMethod::Percentile => percentile_bounds(values, threshold),
        }
    };

    OutlierBounds {
        lower_bound,
        upper_bound,
        method,
        threshold,
        method_details,
    }
}

/// Check whether a value falls outside the bounds.
///
/// Z-score uses the ratio test `|v - mean| / s > threshold` with `s` taken
/// as 1 when the standard deviation is zero; the other methods compare
/// against the bounds directly.
pub fn is_outlier(bounds: &OutlierBounds, value: f64) -> bool {
    match bounds.method_details {
        MethodDetails::ZScore { mean, std_dev } => {
            let scale = if std_dev == 0.0 { 1.0 } else { std_dev };
            (value - mean).abs() / scale > bounds.threshold
        }
        _ => value < bounds.lower_bound || value > bounds.upper_bound,
    }
}

fn zscore_bounds(values: &[f64], threshold: f64) -> (f64, f64, MethodDetails) {
    let mean = sample::mean(values).unwrap_or(0.0);
    let std_dev = sample::std_dev(values).unwrap_or(0.0);
    (
        mean - threshold * std_dev,
        mean + threshold * std_dev,
        MethodDetails::ZScore { mean, std_dev },
    )
}

/// Quartiles by floor index into the sorted sample, not interpolated.
fn iqr_bounds(values: &[f64], threshold: f64) -> (f64, f64, MethodDetails) {
    let sorted = sample::sorted(values);
    let q1 = sorted[floor_index(sorted.len(), 0.25)];
    let q3 = sorted[floor_index(sorted.len(), 0.75)];
    let iqr = q3 - q1;
    (
        q1 - threshold * iqr,
        q3 + threshold * iqr,
        MethodDetails::Iqr { q1, q3, iqr },
    )
}

fn percentile_bounds(values: &[f64], threshold: f64) -> (f64, f64, MethodDetails) {
    let sorted = sample::sorted(values);
    let n = sorted.len() as f64;
    // n·t is formed before dividing so 100·29/100 lands on 29, not 28.999...
    let lower = sorted[clamp_index(sorted.len(), n * threshold / 100.0)];
    let upper = sorted[clamp_index(sorted.len(), n * (100.0 - threshold) / 100.0)];
    (
        lower,
        upper,
        MethodDetails::Percentile {
            lower_percentile: threshold,
            upper_percentile: 100.0 - threshold,
        },
    )
}

/// `floor(n·p)` clamped to a valid index of a non-empty sample.
fn floor_index(n: usize, p: f64) -> usize {
    clamp_index(n, n as f64 * p)
}

/// Floor of a computed position, clamped to `0..n`.
fn clamp_index(n: usize, position: f64) -> usize {
    let idx = position.floor();
    if idx <= 0.0 {
        0
    } else {
        (idx as usize).min(n - 1)
    }
}

fn empty_details(method: OutlierMethod) -> MethodDetails {
    match method {
        OutlierMethod::ZScore => MethodDetails::ZScore {
            mean: 0.0,
            std_dev: 0.0,
        },
        OutlierMethod::Iqr => MethodDetails::Iqr {
            q1: 0.0,
            q3: 0.0,
            iqr: 0.0,
        },
        OutlierMethod::Percentile => MethodDetails::Percentile {
            lower_percentile: 0.0,
            upper_percentile: 0.0,
        },
    }
}
