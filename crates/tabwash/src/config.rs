//! Configuration types for the cleaning engine.
//!
//! This module holds the strategy enums shared by the operations and an
//! [`EngineConfig`] with builder-style setup for callers that want
//! engine-wide defaults (the CLI and the [`Pipeline`](crate::Pipeline)).

use serde::{Deserialize, Serialize};

/// Bound-computation strategy for outlier detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Mean ± threshold · population standard deviation.
    #[default]
    ZScore,
    /// Floor-indexed quartiles ± threshold · IQR.
    Iqr,
    /// Values at the `threshold` and `100 - threshold` percentiles.
    Percentile,
}

impl OutlierMethod {
    /// Conventional threshold for the method.
    pub fn default_threshold(&self) -> f64 {
        match self {
            OutlierMethod::ZScore => 3.0,
            OutlierMethod::Iqr => 1.5,
            OutlierMethod::Percentile => 5.0,
        }
    }

    /// Lowercase method name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierMethod::ZScore => "zscore",
            OutlierMethod::Iqr => "iqr",
            OutlierMethod::Percentile => "percentile",
        }
    }
}

/// Which member of a duplicate group survives removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KeepStrategy {
    /// Keep the first occurrence.
    #[default]
    First,
    /// Keep the last occurrence.
    Last,
    /// Keep the row with the fewest missing cells; ties go to the earliest.
    MinNulls,
}

/// Remediation applied to missing cells of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum MissingValueOperation {
    /// Drop rows whose target cell is missing.
    RemoveRows,
    /// Fill with the mean of the numeric projection.
    FillMean,
    /// Fill with the median of the numeric projection.
    FillMedian,
    /// Fill with the first mode of the numeric projection.
    FillMode,
    /// Fill with a caller-supplied literal.
    FillCustom(String),
}

/// Regression model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegressionModel {
    /// `y = a + b·x` on the first independent column.
    #[default]
    Simple,
    /// Ordinary least squares over every independent column.
    Multiple,
    /// Binary logistic regression on a 0/1 dependent column.
    Logistic,
    /// `y = a·e^(b·x)`, fitted on `ln y`.
    Exponential,
    /// `y = a·x^b`, fitted on `ln y` and `ln x`.
    Power,
}

impl RegressionModel {
    /// Lowercase model name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegressionModel::Simple => "simple",
            RegressionModel::Multiple => "multiple",
            RegressionModel::Logistic => "logistic",
            RegressionModel::Exponential => "exponential",
            RegressionModel::Power => "power",
        }
    }
}

/// Engine-wide defaults.
///
/// Use [`EngineConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust
/// use tabwash::config::{EngineConfig, OutlierMethod};
///
/// let config = EngineConfig::builder()
///     .outlier_method(OutlierMethod::Iqr)
///     .build()
///     .unwrap();
/// assert_eq!(config.effective_outlier_threshold(), 1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Outlier bound strategy.
    /// Default: ZScore
    pub outlier_method: OutlierMethod,

    /// Outlier threshold. `None` uses the method's conventional value.
    /// Default: None
    pub outlier_threshold: Option<f64>,

    /// Keep strategy for duplicate removal.
    /// Default: First
    pub keep_strategy: KeepStrategy,

    /// Key columns for duplicate detection. Empty means every header.
    /// Default: empty
    pub duplicate_columns: Vec<String>,

    /// Target range for min-max scaling.
    /// Default: (0.0, 1.0)
    pub scale_range: (f64, f64),

    /// Newton iterations allowed when fitting logistic models.
    /// Default: 100
    pub logistic_max_iterations: usize,

    /// Convergence tolerance on the logistic coefficient update.
    /// Default: 1e-8
    pub logistic_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            outlier_method: OutlierMethod::default(),
            outlier_threshold: None,
            keep_strategy: KeepStrategy::default(),
            duplicate_columns: Vec::new(),
            scale_range: crate::transform::DEFAULT_SCALE_RANGE,
            logistic_max_iterations: 100,
            logistic_tolerance: 1e-8,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// The threshold actually used for outlier detection.
    pub fn effective_outlier_threshold(&self) -> f64 {
        self.outlier_threshold
            .unwrap_or_else(|| self.outlier_method.default_threshold())
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_outlier_threshold(self.outlier_method, self.effective_outlier_threshold())?;

        let (min, max) = self.scale_range;
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ConfigValidationError::InvalidScaleRange { min, max });
        }

        if self.logistic_max_iterations == 0 {
            return Err(ConfigValidationError::InvalidIterations(
                self.logistic_max_iterations,
            ));
        }

        if !(self.logistic_tolerance.is_finite() && self.logistic_tolerance > 0.0) {
            return Err(ConfigValidationError::InvalidTolerance(
                self.logistic_tolerance,
            ));
        }

        Ok(())
    }
}

/// Check an outlier threshold against its method's domain.
pub fn validate_outlier_threshold(
    method: OutlierMethod,
    threshold: f64,
) -> Result<(), ConfigValidationError> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(ConfigValidationError::InvalidThreshold {
            method: method.as_str().to_string(),
            value: threshold,
        });
    }
    if method == OutlierMethod::Percentile && threshold >= 50.0 {
        return Err(ConfigValidationError::InvalidThreshold {
            method: method.as_str().to_string(),
            value: threshold,
        });
    }
    Ok(())
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid {method} threshold: {value} (must be positive, and below 50 for percentile)")]
    InvalidThreshold { method: String, value: f64 },

    #[error("Invalid scale range: [{min}, {max}] (min must be below max)")]
    InvalidScaleRange { min: f64, max: f64 },

    #[error("Invalid logistic iterations: {0} (must be at least 1)")]
    InvalidIterations(usize),

    #[error("Invalid logistic tolerance: {0} (must be positive)")]
    InvalidTolerance(f64),
}

/// Builder for [`EngineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    outlier_method: Option<OutlierMethod>,
    outlier_threshold: Option<f64>,
    keep_strategy: Option<KeepStrategy>,
    duplicate_columns: Option<Vec<String>>,
    scale_range: Option<(f64, f64)>,
    logistic_max_iterations: Option<usize>,
    logistic_tolerance: Option<f64>,
}

impl EngineConfigBuilder {
    /// Set the outlier bound strategy.
    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier_method = Some(method);
        self
    }

    /// Set an explicit outlier threshold.
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = Some(threshold);
        self
    }

    /// Set the keep strategy for duplicate removal.
    pub fn keep_strategy(mut self, strategy: KeepStrategy) -> Self {
        self.keep_strategy = Some(strategy);
        self
    }

    /// Set the key columns used for duplicate detection.
    pub fn duplicate_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.duplicate_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the min-max scaling range.
    pub fn scale_range(mut self, min: f64, max: f64) -> Self {
        self.scale_range = Some((min, max));
        self
    }

    /// Set the maximum Newton iterations for logistic fits.
    pub fn logistic_max_iterations(mut self, iterations: usize) -> Self {
        self.logistic_max_iterations = Some(iterations);
        self
    }

    /// Set the convergence tolerance for logistic fits.
    pub fn logistic_tolerance(mut self, tolerance: f64) -> Self {
        self.logistic_tolerance = Some(tolerance);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `EngineConfig` or an error if validation fails.
    pub fn build(self) -> Result<EngineConfig, ConfigValidationError> {
        let defaults = EngineConfig::default();
        let config = EngineConfig {
            outlier_method: self.outlier_method.unwrap_or_default(),
            outlier_threshold: self.outlier_threshold,
            keep_strategy: self.keep_strategy.unwrap_or_default(),
            duplicate_columns: self.duplicate_columns.unwrap_or_default(),
            scale_range: self.scale_range.unwrap_or(defaults.scale_range),
            logistic_max_iterations: self
                .logistic_max_iterations
                .unwrap_or(defaults.logistic_max_iterations),
            logistic_tolerance: self
                .logistic_tolerance
                .unwrap_or(defaults.logistic_tolerance),
        };

        config.validate()?;
        Ok(config)
    }
}
