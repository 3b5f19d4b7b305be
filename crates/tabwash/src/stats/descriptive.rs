//! Descriptive statistics over raw column cells.
//!
//! Every function filters its input to the numeric projection first, except
//! [`mode`], which counts the string form of every non-missing cell. None of
//! them panic or return NaN: an undefined result is `None` (or an empty
//! vector for `mode`).

use super::sample;
use crate::table::Cell;
use crate::types::ScalarValue;
use crate::utils::parse_number;
use std::collections::HashMap;

/// Numeric projection of a cell slice, in order.
pub fn numeric_values(cells: &[Cell]) -> Vec<f64> {
    cells.iter().filter_map(Cell::as_number).collect()
}

/// Count of numeric cells.
pub fn count(cells: &[Cell]) -> usize {
    numeric_values(cells).len()
}

pub fn sum(cells: &[Cell]) -> Option<f64> {
    let values = numeric_values(cells);
    (!values.is_empty()).then(|| sample::sum(&values))
}

pub fn min(cells: &[Cell]) -> Option<f64> {
    sample::min(&numeric_values(cells))
}

pub fn max(cells: &[Cell]) -> Option<f64> {
    sample::max(&numeric_values(cells))
}

// =============================================================================
// Central Tendency
// =============================================================================

pub fn mean(cells: &[Cell]) -> Option<f64> {
    sample::mean(&numeric_values(cells))
}

/// Geometric mean of the strictly positive values.
pub fn geometric_mean(cells: &[Cell]) -> Option<f64> {
    let logs: Vec<f64> = numeric_values(cells)
        .into_iter()
        .filter(|v| *v > 0.0)
        .map(f64::ln)
        .collect();
    sample::mean(&logs).map(f64::exp)
}

/// Harmonic mean of the non-zero values.
pub fn harmonic_mean(cells: &[Cell]) -> Option<f64> {
    let values: Vec<f64> = numeric_values(cells)
        .into_iter()
        .filter(|v| *v != 0.0)
        .collect();
    if values.is_empty() {
        return None;
    }
    let reciprocal_sum: f64 = values.iter().map(|v| 1.0 / v).sum();
    if reciprocal_sum == 0.0 {
        return None;
    }
    Some(values.len() as f64 / reciprocal_sum)
}

pub fn median(cells: &[Cell]) -> Option<f64> {
    sample::median(&numeric_values(cells))
}

/// Every value tied for the highest frequency, in first-seen order.
///
/// Frequencies are counted on the string form of each non-missing cell, so
/// `"1"` and `"1.0"` are different keys. Keys that parse as numbers come back
/// as numbers.
pub fn mode(cells: &[Cell]) -> Vec<ScalarValue> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for cell in cells.iter().filter(|c| !c.is_missing()) {
        let key = cell.to_text();
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    let Some(max_count) = counts.values().copied().max() else {
        return Vec::new();
    };

    order
        .into_iter()
        .filter(|key| counts.get(key) == Some(&max_count))
        .map(|key| match parse_number(&key) {
            Some(n) => ScalarValue::Number(n),
            None => ScalarValue::Text(key),
        })
        .collect()
}

// =============================================================================
// Dispersion
// =============================================================================

/// Population variance; at least two numeric values.
pub fn variance(cells: &[Cell]) -> Option<f64> {
    sample::variance(&numeric_values(cells))
}

/// Population standard deviation; at least two numeric values.
pub fn standard_deviation(cells: &[Cell]) -> Option<f64> {
    sample::std_dev(&numeric_values(cells))
}

pub fn range(cells: &[Cell]) -> Option<f64> {
    let values = numeric_values(cells);
    Some(sample::max(&values)? - sample::min(&values)?)
}

/// Interpolated Q3 - Q1; at least four numeric values.
pub fn interquartile_range(cells: &[Cell]) -> Option<f64> {
    let (q1, _, q3) = quartiles(&numeric_values(cells))?;
    Some(q3 - q1)
}

pub fn mean_absolute_deviation(cells: &[Cell]) -> Option<f64> {
    let values = numeric_values(cells);
    let m = sample::mean(&values)?;
    let deviations: Vec<f64> = values.iter().map(|v| (v - m).abs()).collect();
    sample::mean(&deviations)
}

/// Standard deviation over mean.
pub fn coefficient_of_variation(cells: &[Cell]) -> Option<f64> {
    let values = numeric_values(cells);
    let m = nonzero_mean(&values)?;
    Some(sample::std_dev(&values)? / m)
}

/// Variance over mean.
pub fn coefficient_of_dispersion(cells: &[Cell]) -> Option<f64> {
    let values = numeric_values(cells);
    let m = nonzero_mean(&values)?;
    Some(sample::variance(&values)? / m)
}

/// Rank-weighted Gini coefficient of the ascending sample.
pub fn gini_coefficient(cells: &[Cell]) -> Option<f64> {
    let sorted = sample::sorted(&numeric_values(cells));
    let n = sorted.len();
    if n <= 1 {
        return None;
    }
    let total = sample::sum(&sorted);
    if total == 0.0 {
        return None;
    }
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i + 1) as f64 * v)
        .sum();
    let n = n as f64;
    Some(2.0 * weighted / (n * total) - (n + 1.0) / n)
}

// =============================================================================
// Distribution Shape
// =============================================================================

/// Moment coefficient of skewness `m3 / m2^1.5`; at least three values.
pub fn fisher_skewness(cells: &[Cell]) -> Option<f64> {
    moment_skewness(&numeric_values(cells))
}

/// `3 (mean - median) / stdDev`; at least three values.
pub fn pearson_skewness(cells: &[Cell]) -> Option<f64> {
    let values = numeric_values(cells);
    if values.len() < 3 {
        return None;
    }
    let sd = sample::std_dev(&values).filter(|sd| *sd != 0.0)?;
    Some(3.0 * (sample::mean(&values)? - sample::median(&values)?) / sd)
}

/// Bowley skewness `((q3 - q2) - (q2 - q1)) / (q3 - q1)`; at least four values.
pub fn quartile_skewness(cells: &[Cell]) -> Option<f64> {
    let (q1, q2, q3) = quartiles(&numeric_values(cells))?;
    let spread = q3 - q1;
    if spread == 0.0 {
        return None;
    }
    Some(((q3 - q2) - (q2 - q1)) / spread)
}

/// Excess kurtosis `m4 / m2^2 - 3`; at least four values.
pub fn fisher_kurtosis(cells: &[Cell]) -> Option<f64> {
    moment_kurtosis(&numeric_values(cells))
}

/// Fisher kurtosis plus three.
pub fn pearson_kurtosis(cells: &[Cell]) -> Option<f64> {
    fisher_kurtosis(cells).map(|k| k + 3.0)
}

pub(crate) fn moment_skewness(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let m2 = sample::central_moment(values, 2).filter(|m2| *m2 != 0.0)?;
    Some(sample::central_moment(values, 3)? / m2.powf(1.5))
}

pub(crate) fn moment_kurtosis(values: &[f64]) -> Option<f64> {
    if values.len() < 4 {
        return None;
    }
    let m2 = sample::central_moment(values, 2).filter(|m2| *m2 != 0.0)?;
    Some(sample::central_moment(values, 4)? / (m2 * m2) - 3.0)
}

fn quartiles(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.len() < 4 {
        return None;
    }
    let sorted = sample::sorted(values);
    Some((
        sample::quantile_sorted(&sorted, 0.25)?,
        sample::quantile_sorted(&sorted, 0.5)?,
        sample::quantile_sorted(&sorted, 0.75)?,
    ))
}

fn nonzero_mean(values: &[f64]) -> Option<f64> {
    if values.len() <= 1 {
        return None;
    }
    sample::mean(values).filter(|m| *m != 0.0)
}
