//! Binary logistic regression fitted by iteratively reweighted least squares.

use super::solver::{design_matrix, solve};
use crate::error::{EngineError, Result};
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, warn};

/// Probabilities are kept this far from 0 and 1 when weighting.
const PROBABILITY_FLOOR: f64 = 1e-10;

/// Newton-Raphson settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticOptions {
    pub max_iterations: usize,
    /// Convergence threshold on the largest coefficient update.
    pub tolerance: f64,
}

impl Default for LogisticOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

/// A fitted logistic model.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticFit {
    /// Intercept first, then one coefficient per predictor.
    pub coefficients: Vec<f64>,
    /// Fitted probabilities `P(y = 1)`.
    pub probabilities: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
    z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

/// Fit `P(y = 1) = σ(b0 + b1·x1 + ... + bp·xp)` on 0/1 outcomes.
///
/// Both classes must be present. If the Hessian becomes singular after the
/// first step (typically perfect separation) the last estimate is kept.
pub fn fit_logistic(rows: &[Vec<f64>], y: &[f64], options: LogisticOptions) -> Result<LogisticFit> {
    let predictors = rows.first().map_or(0, Vec::len);
    let required = predictors + 1;
    if rows.len() < required || rows.len() != y.len() {
        return Err(EngineError::InsufficientData {
            operation: "logistic regression".to_string(),
            required,
            actual: rows.len().min(y.len()),
        });
    }
    let positives = y.iter().filter(|v| **v == 1.0).count();
    if positives == 0 || positives == y.len() {
        return Err(EngineError::SingularMatrix(
            "logistic regression (dependent column has a single class)".to_string(),
        ));
    }

    let x = design_matrix(rows);
    let target = Array1::from_vec(y.to_vec());
    let mut weights = Array1::<f64>::zeros(x.ncols());
    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        let p = sigmoid(&x.dot(&weights));
        let w = p.mapv(|pi| {
            let pi = pi.clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
            pi * (1.0 - pi)
        });

        // Xᵀ W X
        let weighted: Array2<f64> = &x * &w.view().insert_axis(Axis(1));
        let hessian = x.t().dot(&weighted);
        let gradient = x.t().dot(&(&target - &p));

        let Some(step) = solve(&hessian, &gradient) else {
            if iterations == 0 {
                return Err(EngineError::SingularMatrix("logistic regression".to_string()));
            }
            warn!(
                "Logistic fit stopped after {} iterations: singular Hessian",
                iterations
            );
            break;
        };

        weights += &step;
        iterations += 1;

        let largest = step.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if largest < options.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        debug!("Logistic fit did not converge in {} iterations", iterations);
    }

    Ok(LogisticFit {
        probabilities: sigmoid(&x.dot(&weights)).to_vec(),
        coefficients: weights.to_vec(),
        iterations,
        converged,
    })
}
