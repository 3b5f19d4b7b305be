//! Regression engine.
//!
//! Fits one of five model families on the rows where every involved column
//! is numeric, and reports the equation with R², adjusted R², the residual
//! standard error and the number of observations used.
//!
//! - Simple, exponential and power models use the first independent column.
//! - Multiple and logistic models use every independent column.
//! - Exponential and power models are linearized with `ln` and silently
//!   skip rows outside their domain. Their metrics are computed on the
//!   original scale.

pub mod linear;
pub mod logistic;
mod solver;

pub use linear::FitMetrics;
pub use logistic::LogisticOptions;

use crate::config::{EngineConfig, RegressionModel};
use crate::error::{EngineError, Result};
use crate::table::{Table, numeric_value};
use crate::types::RegressionResult;
use tracing::debug;

/// Fits regression models on table columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionEngine {
    logistic: LogisticOptions,
}

impl RegressionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine using the configuration's logistic settings.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            logistic: LogisticOptions {
                max_iterations: config.logistic_max_iterations,
                tolerance: config.logistic_tolerance,
            },
        }
    }

    /// Fit `model` predicting `dependent` from `independents`.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` for unknown columns, `InvalidConfig` without an
    /// independent column, `InsufficientData` with fewer usable rows than
    /// parameters, and `SingularMatrix` for a degenerate design.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabwash::{RegressionEngine, RegressionModel, Table};
    ///
    /// let table = Table::from_rows(["x", "y"], [vec!["1", "3"], vec!["2", "5"], vec!["3", "7"]]);
    /// let result = RegressionEngine::new()
    ///     .fit(&table, "y", &["x".to_string()], RegressionModel::Simple)
    ///     .unwrap();
    /// assert!((result.slope.unwrap() - 2.0).abs() < 1e-9);
    /// ```
    pub fn fit(
        &self,
        table: &Table,
        dependent: &str,
        independents: &[String],
        model: RegressionModel,
    ) -> Result<RegressionResult> {
        table.require_column(dependent)?;
        for column in independents {
            table.require_column(column)?;
        }
        if independents.is_empty() {
            return Err(EngineError::InvalidConfig(
                "regression needs at least one independent column".to_string(),
            ));
        }

        let predictors: &[String] = match model {
            RegressionModel::Multiple | RegressionModel::Logistic => independents,
            RegressionModel::Simple | RegressionModel::Exponential | RegressionModel::Power => {
                &independents[..1]
            }
        };

        let (rows, y) = Self::observations(table, dependent, predictors, model);
        debug!(
            "Fitting {} regression of '{}' on {:?} with {} observations",
            model.as_str(),
            dependent,
            predictors,
            y.len()
        );

        match model {
            RegressionModel::Simple | RegressionModel::Multiple => {
                Self::fit_linear(model, dependent, predictors, &rows, &y)
            }
            RegressionModel::Exponential | RegressionModel::Power => {
                Self::fit_log_linear(model, dependent, &predictors[0], &rows, &y)
            }
            RegressionModel::Logistic => self.fit_logistic(dependent, predictors, &rows, &y),
        }
    }

    /// Rows where the dependent and every predictor are numeric and inside
    /// the model's domain.
    fn observations(
        table: &Table,
        dependent: &str,
        predictors: &[String],
        model: RegressionModel,
    ) -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();

        for row in &table.rows {
            let Some(target) = numeric_value(row.get(dependent)) else {
                continue;
            };
            let Some(xs) = predictors
                .iter()
                .map(|column| numeric_value(row.get(column.as_str())))
                .collect::<Option<Vec<f64>>>()
            else {
                continue;
            };

            let in_domain = match model {
                RegressionModel::Simple | RegressionModel::Multiple => true,
                RegressionModel::Logistic => target == 0.0 || target == 1.0,
                RegressionModel::Exponential => target > 0.0,
                RegressionModel::Power => target > 0.0 && xs.iter().all(|x| *x > 0.0),
            };
            if in_domain {
                rows.push(xs);
                y.push(target);
            }
        }

        (rows, y)
    }

    fn fit_linear(
        model: RegressionModel,
        dependent: &str,
        predictors: &[String],
        rows: &[Vec<f64>],
        y: &[f64],
    ) -> Result<RegressionResult> {
        let operation = format!("{} regression", model.as_str());
        let fit = linear::ordinary_least_squares(&operation, rows, y)?;
        let metrics = FitMetrics::from_fitted(y, &fit.fitted, predictors.len());

        let mut result = Self::result(
            model,
            linear_equation(dependent, predictors, &fit.coefficients),
            metrics,
            y.len(),
        );
        if model == RegressionModel::Simple {
            result.intercept = Some(fit.coefficients[0]);
            result.slope = Some(fit.coefficients[1]);
        } else {
            result.coefficients = Some(fit.coefficients);
        }
        Ok(result)
    }

    /// `ln y = ln a + b·x` (exponential) or `ln y = ln a + b·ln x` (power).
    fn fit_log_linear(
        model: RegressionModel,
        dependent: &str,
        predictor: &str,
        rows: &[Vec<f64>],
        y: &[f64],
    ) -> Result<RegressionResult> {
        let operation = format!("{} regression", model.as_str());
        let log_y: Vec<f64> = y.iter().map(|v| v.ln()).collect();
        let transformed: Vec<Vec<f64>> = match model {
            RegressionModel::Power => rows.iter().map(|r| vec![r[0].ln()]).collect(),
            _ => rows.to_vec(),
        };

        let fit = linear::ordinary_least_squares(&operation, &transformed, &log_y)?;
        let a = fit.coefficients[0].exp();
        let b = fit.coefficients[1];

        let predicted: Vec<f64> = rows
            .iter()
            .map(|r| match model {
                RegressionModel::Power => a * r[0].powf(b),
                _ => a * (b * r[0]).exp(),
            })
            .collect();
        let metrics = FitMetrics::from_fitted(y, &predicted, 1);

        let equation = match model {
            RegressionModel::Power => {
                format!("{} = {} * {}^{}", dependent, fmt_coef(a), predictor, fmt_coef(b))
            }
            _ => format!("{} = {} * e^({} * {})", dependent, fmt_coef(a), fmt_coef(b), predictor),
        };

        let mut result = Self::result(model, equation, metrics, y.len());
        result.intercept = Some(a);
        result.slope = Some(b);
        Ok(result)
    }

    fn fit_logistic(
        &self,
        dependent: &str,
        predictors: &[String],
        rows: &[Vec<f64>],
        y: &[f64],
    ) -> Result<RegressionResult> {
        let fit = logistic::fit_logistic(rows, y, self.logistic)?;
        let metrics = FitMetrics::from_fitted(y, &fit.probabilities, predictors.len());

        let linear = linear_terms(predictors, &fit.coefficients);
        let equation = format!("P({} = 1) = 1 / (1 + e^-({}))", dependent, linear);

        let mut result = Self::result(RegressionModel::Logistic, equation, metrics, y.len());
        result.coefficients = Some(fit.coefficients);
        Ok(result)
    }

    fn result(
        model: RegressionModel,
        equation: String,
        metrics: FitMetrics,
        observations: usize,
    ) -> RegressionResult {
        RegressionResult {
            model,
            equation,
            r2: metrics.r2,
            adjusted_r2: metrics.adjusted_r2,
            standard_error: metrics.standard_error,
            observations,
            slope: None,
            intercept: None,
            coefficients: None,
        }
    }
}

fn fmt_coef(value: f64) -> String {
    format!("{:.4}", value)
}

/// `b0 + b1 * x1 - b2 * x2 ...` with signs folded into the operators.
fn linear_terms(predictors: &[String], coefficients: &[f64]) -> String {
    let mut terms = fmt_coef(coefficients[0]);
    for (name, coef) in predictors.iter().zip(&coefficients[1..]) {
        let sign = if *coef < 0.0 { '-' } else { '+' };
        terms.push_str(&format!(" {} {} * {}", sign, fmt_coef(coef.abs()), name));
    }
    terms
}

fn linear_equation(dependent: &str, predictors: &[String], coefficients: &[f64]) -> String {
    format!("{} = {}", dependent, linear_terms(predictors, coefficients))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn engine() -> RegressionEngine {
        RegressionEngine::new()
    }

    // ==================== linear tests ====================

    #[test]
    fn test_simple_regression() {
        let table = Table::from_rows(
            ["x", "y"],
            [vec!["1", "3"], vec!["2", "5"], vec!["x", "9"], vec!["3", "7"], vec!["4", "9"]],
        );
        let result = engine().fit(&table, "y", &cols(&["x"]), RegressionModel::Simple).unwrap();

        assert_eq!(result.observations, 4);
        assert!((result.intercept.unwrap() - 1.0).abs() < 1e-9);
        assert!((result.slope.unwrap() - 2.0).abs() < 1e-9);
        assert!((result.r2 - 1.0).abs() < 1e-12);
        assert_eq!(result.equation, "y = 1.0000 + 2.0000 * x");
        assert!(result.coefficients.is_none());
    }

    #[test]
    fn test_multiple_regression() {
        // y = 1 + 2a - b
        let table = Table::from_rows(
            ["a", "b", "y"],
            [
                vec!["1", "1", "2"],
                vec!["2", "1", "4"],
                vec!["1", "3", "0"],
                vec!["3", "2", "5"],
                vec!["4", "5", "4"],
            ],
        );
        let result = engine()
            .fit(&table, "y", &cols(&["a", "b"]), RegressionModel::Multiple)
            .unwrap();
        let coefficients = result.coefficients.unwrap();
        assert_eq!(coefficients.len(), 3);
        assert!((coefficients[0] - 1.0).abs() < 1e-9);
        assert!((coefficients[1] - 2.0).abs() < 1e-9);
        assert!((coefficients[2] + 1.0).abs() < 1e-9);
        assert_eq!(result.equation, "y = 1.0000 + 2.0000 * a - 1.0000 * b");
    }

    #[test]
    fn test_simple_uses_first_independent_only() {
        let table = Table::from_rows(
            ["x", "z", "y"],
            [vec!["1", "q", "2"], vec!["2", "q", "4"], vec!["3", "q", "6"]],
        );
        let result = engine()
            .fit(&table, "y", &cols(&["x", "z"]), RegressionModel::Simple)
            .unwrap();
        assert_eq!(result.observations, 3);
    }

    // ==================== log-linear tests ====================

    #[test]
    fn test_exponential_regression() {
        // y = 2·e^(0.5x), with a non-positive y that must be skipped
        let rows: Vec<Vec<String>> = (0..5)
            .map(|i| {
                let x = f64::from(i);
                vec![x.to_string(), (2.0 * (0.5 * x).exp()).to_string()]
            })
            .chain(std::iter::once(vec!["9".to_string(), "-1".to_string()]))
            .collect();
        let table = Table::from_rows(["x", "y"], rows);
        let result = engine()
            .fit(&table, "y", &cols(&["x"]), RegressionModel::Exponential)
            .unwrap();

        assert_eq!(result.observations, 5);
        assert!((result.intercept.unwrap() - 2.0).abs() < 1e-9);
        assert!((result.slope.unwrap() - 0.5).abs() < 1e-9);
        assert!((result.r2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_regression() {
        // y = 3·x^2, x = 0 is outside the domain
        let table = Table::from_rows(
            ["x", "y"],
            [vec!["0", "1"], vec!["1", "3"], vec!["2", "12"], vec!["3", "27"], vec!["4", "48"]],
        );
        let result = engine().fit(&table, "y", &cols(&["x"]), RegressionModel::Power).unwrap();
        assert_eq!(result.observations, 4);
        assert!((result.intercept.unwrap() - 3.0).abs() < 1e-9);
        assert!((result.slope.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(result.equation, "y = 3.0000 * x^2.0000");
    }

    // ==================== logistic tests ====================

    #[test]
    fn test_logistic_regression() {
        let table = Table::from_rows(
            ["hours", "passed"],
            [
                vec!["1", "0"],
                vec!["2", "0"],
                vec!["3", "1"],
                vec!["4", "0"],
                vec!["5", "1"],
                vec!["6", "0"],
                vec!["7", "1"],
                vec!["8", "1"],
                vec!["9", "2"],
            ],
        );
        let result = engine()
            .fit(&table, "passed", &cols(&["hours"]), RegressionModel::Logistic)
            .unwrap();
        // the row with passed = 2 is not a 0/1 outcome
        assert_eq!(result.observations, 8);
        assert!(result.coefficients.unwrap()[1] > 0.0);
        assert!(result.r2 > 0.0 && result.r2 < 1.0);
        assert!(result.equation.starts_with("P(passed = 1) = 1 / (1 + e^-("));
    }

    #[test]
    fn test_logistic_settings_come_from_config() {
        let config = EngineConfig::builder()
            .logistic_max_iterations(1)
            .logistic_tolerance(1e-4)
            .build()
            .unwrap();
        let limited = RegressionEngine::from_config(&config);
        assert_eq!(limited.logistic.max_iterations, 1);
        assert_eq!(limited.logistic.tolerance, 1e-4);

        let table = Table::from_rows(
            ["x", "y"],
            [
                vec!["1", "0"],
                vec!["2", "0"],
                vec!["3", "1"],
                vec!["4", "0"],
                vec!["5", "1"],
                vec!["6", "1"],
            ],
        );
        let one_step = limited
            .fit(&table, "y", &cols(&["x"]), RegressionModel::Logistic)
            .unwrap();
        let converged = RegressionEngine::from_config(&EngineConfig::default())
            .fit(&table, "y", &cols(&["x"]), RegressionModel::Logistic)
            .unwrap();
        assert_ne!(one_step.coefficients, converged.coefficients);
        assert_eq!(
            converged,
            engine()
                .fit(&table, "y", &cols(&["x"]), RegressionModel::Logistic)
                .unwrap()
        );
    }

    // ==================== error tests ====================

    #[test]
    fn test_errors() {
        let table = Table::from_rows(["x", "y"], [vec!["1", "2"]]);
        assert!(matches!(
            engine().fit(&table, "nope", &cols(&["x"]), RegressionModel::Simple),
            Err(EngineError::ColumnNotFound(_))
        ));
        assert!(matches!(
            engine().fit(&table, "y", &[], RegressionModel::Simple),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(matches!(
            engine().fit(&table, "y", &cols(&["x"]), RegressionModel::Simple),
            Err(EngineError::InsufficientData { required: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_two_points_report_zero_adjusted_metrics() {
        let table = Table::from_rows(["x", "y"], [vec!["1", "2"], vec!["2", "5"]]);
        let result = engine().fit(&table, "y", &cols(&["x"]), RegressionModel::Simple).unwrap();
        assert_eq!(result.adjusted_r2, 0.0);
        assert_eq!(result.standard_error, 0.0);
        assert!(result.r2.is_finite());
    }
}
