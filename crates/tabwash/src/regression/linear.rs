//! Least-squares fits and their quality metrics.

use super::solver::{design_matrix, least_squares};
use crate::error::{EngineError, Result};
use ndarray::Array1;

/// Fit quality shared by every model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    pub r2: f64,
    pub adjusted_r2: f64,
    pub standard_error: f64,
}

impl FitMetrics {
    /// Metrics from observed and fitted values with `predictors` slope terms.
    ///
    /// A constant response gives `r2 = 1` when the fit is exact and 0
    /// otherwise. Adjusted R² and the standard error are reported as 0 when
    /// no residual degrees of freedom remain.
    pub fn from_fitted(observed: &[f64], fitted: &[f64], predictors: usize) -> Self {
        let n = observed.len();
        let mean = observed.iter().sum::<f64>() / n.max(1) as f64;
        let ss_res: f64 = observed
            .iter()
            .zip(fitted)
            .map(|(y, f)| (y - f).powi(2))
            .sum();
        let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res <= f64::EPSILON {
            1.0
        } else {
            0.0
        };

        let dof = n as f64 - predictors as f64 - 1.0;
        let adjusted_r2 = finite_or_zero(1.0 - (1.0 - r2) * (n as f64 - 1.0) / dof);
        let standard_error = finite_or_zero((ss_res / dof).sqrt());

        Self {
            r2,
            adjusted_r2,
            standard_error,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// An ordinary least-squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    /// Intercept first, then one coefficient per predictor.
    pub coefficients: Vec<f64>,
    pub fitted: Vec<f64>,
}

/// Fit `y = b0 + b1·x1 + ... + bp·xp` by ordinary least squares.
///
/// `rows` holds one predictor vector per observation, all the same length.
pub fn ordinary_least_squares(operation: &str, rows: &[Vec<f64>], y: &[f64]) -> Result<LinearFit> {
    let predictors = rows.first().map_or(0, Vec::len);
    let required = predictors + 1;
    if rows.len() < required || rows.len() != y.len() {
        return Err(EngineError::InsufficientData {
            operation: operation.to_string(),
            required,
            actual: rows.len().min(y.len()),
        });
    }

    let x = design_matrix(rows);
    let target = Array1::from_vec(y.to_vec());
    let weights =
        least_squares(&x, &target).ok_or_else(|| EngineError::SingularMatrix(operation.to_string()))?;

    Ok(LinearFit {
        fitted: x.dot(&weights).to_vec(),
        coefficients: weights.to_vec(),
    })
}
