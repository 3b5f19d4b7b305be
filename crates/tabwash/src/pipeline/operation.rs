//! Serializable pipeline operations.

use crate::cleaner::DuplicateDetector;
use crate::config::{
    EngineConfig, KeepStrategy, MissingValueOperation, OutlierMethod, validate_outlier_threshold,
};
use crate::error::{EngineError, Result};
use crate::imputers::{MissingValueImputer, RemediationOutcome};
use crate::outliers::OutlierHandler;
use crate::table::Table;
use crate::transform::{ColumnTransformer, Transform};
use crate::types::{ActionType, OperationSummary};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One remediation or transform step.
///
/// Serialized with an `op` tag, e.g.
/// `{"op": "handle_missing", "column": "age", "operation": {"kind": "fill-mean"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Drop duplicate rows. Empty `columns` falls back to the configured key
    /// columns, then to every header.
    RemoveDuplicates {
        #[serde(default)]
        columns: Vec<String>,
        #[serde(default)]
        keep: Option<KeepStrategy>,
    },
    /// Remove rows or fill cells where `column` is missing.
    HandleMissing {
        column: String,
        operation: MissingValueOperation,
    },
    /// Drop rows whose `column` value is an outlier.
    RemoveOutliers {
        column: String,
        #[serde(default)]
        method: Option<OutlierMethod>,
        #[serde(default)]
        threshold: Option<f64>,
    },
    /// Clamp outlier cells of `column` to the nearer bound.
    CapOutliers {
        column: String,
        #[serde(default)]
        method: Option<OutlierMethod>,
        #[serde(default)]
        threshold: Option<f64>,
    },
    /// Apply a column transform to each listed column in turn.
    Transform {
        columns: Vec<String>,
        transform: Transform,
    },
}

impl Operation {
    /// Columns the operation reads, which must exist when it runs.
    ///
    /// Duplicate removal with no key columns of its own reads the
    /// configured key columns; an empty result there means every header.
    pub fn columns<'a>(&'a self, config: &'a EngineConfig) -> Vec<&'a str> {
        match self {
            Self::RemoveDuplicates { columns, .. } => Self::duplicate_keys(columns, config)
                .iter()
                .map(String::as_str)
                .collect(),
            Self::Transform { columns, .. } => columns.iter().map(String::as_str).collect(),
            Self::HandleMissing { column, .. }
            | Self::RemoveOutliers { column, .. }
            | Self::CapOutliers { column, .. } => vec![column.as_str()],
        }
    }

    /// Short description used in progress messages.
    pub fn describe(&self) -> String {
        match self {
            Self::RemoveDuplicates { .. } => "remove duplicates".to_string(),
            Self::HandleMissing { column, operation } => {
                format!("handle missing values in '{}' ({:?})", column, operation)
            }
            Self::RemoveOutliers { column, .. } => format!("remove outliers in '{}'", column),
            Self::CapOutliers { column, .. } => format!("cap outliers in '{}'", column),
            Self::Transform { columns, transform } => {
                format!("{} on {:?}", transform.name(), columns)
            }
        }
    }

    /// Check parameters that do not depend on the data.
    pub fn validate(&self, config: &EngineConfig) -> Result<()> {
        match self {
            Self::RemoveOutliers {
                method, threshold, ..
            }
            | Self::CapOutliers {
                method, threshold, ..
            } => {
                let (method, threshold) = Self::outlier_settings(*method, *threshold, config);
                validate_outlier_threshold(method, threshold)?;
            }
            Self::Transform {
                transform: Transform::RegexReplace { pattern, .. },
                ..
            } => {
                Regex::new(pattern).map_err(|e| EngineError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            }
            Self::Transform {
                transform: transform @ Transform::Scale { .. },
                ..
            } => {
                if let Transform::Scale {
                    min: Some(min),
                    max: Some(max),
                } = transform.with_scale_range(config.scale_range)
                {
                    if !(min.is_finite() && max.is_finite() && min < max) {
                        return Err(EngineError::InvalidConfig(format!(
                            "scale range [{}, {}] must have min below max",
                            min, max
                        )));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Check that every referenced column exists in `table`.
    pub fn check_columns(&self, table: &Table, config: &EngineConfig) -> Result<()> {
        for column in self.columns(config) {
            table.require_column(column)?;
        }
        Ok(())
    }

    fn duplicate_keys<'a>(columns: &'a [String], config: &'a EngineConfig) -> &'a [String] {
        if columns.is_empty() {
            &config.duplicate_columns
        } else {
            columns
        }
    }

    fn outlier_settings(
        method: Option<OutlierMethod>,
        threshold: Option<f64>,
        config: &EngineConfig,
    ) -> (OutlierMethod, f64) {
        match method {
            Some(method) => (method, threshold.unwrap_or_else(|| method.default_threshold())),
            None => (
                config.outlier_method,
                threshold.unwrap_or_else(|| config.effective_outlier_threshold()),
            ),
        }
    }

    /// Apply the operation, returning the new table and a summary of it.
    pub fn apply(&self, table: &Table, config: &EngineConfig) -> Result<(Table, OperationSummary)> {
        self.check_columns(table, config)?;

        let (result, action_type, target, cells_changed, message) = match self {
            Self::RemoveDuplicates { columns, keep } => {
                let columns = Self::duplicate_keys(columns, config);
                let keep = keep.unwrap_or(config.keep_strategy);
                let outcome = DuplicateDetector::remove_duplicates(table, columns, keep);
                let message = format!("Removed {} duplicate rows", outcome.removed.len());
                (
                    outcome.table,
                    ActionType::DuplicatesRemoved,
                    "table".to_string(),
                    0,
                    message,
                )
            }
            Self::HandleMissing { column, operation } => {
                match MissingValueImputer::apply(table, column, operation) {
                    RemediationOutcome::Removed(outcome) => {
                        let message = format!(
                            "Removed {} rows with missing '{}'",
                            outcome.removed.len(),
                            column
                        );
                        (outcome.table, ActionType::RowsRemoved, column.clone(), 0, message)
                    }
                    RemediationOutcome::Filled(outcome) => {
                        let message = format!(
                            "Filled {} missing cells in '{}' with '{}'",
                            outcome.cells_filled, column, outcome.fill_value
                        );
                        (
                            outcome.table,
                            ActionType::ValuesFilled,
                            column.clone(),
                            outcome.cells_filled,
                            message,
                        )
                    }
                }
            }
            Self::RemoveOutliers {
                column,
                method,
                threshold,
            } => {
                let (method, threshold) = Self::outlier_settings(*method, *threshold, config);
                let outcome = OutlierHandler::remove_outliers(table, column, method, threshold);
                let message = format!(
                    "Removed {} outlier rows from '{}' ({}, threshold {})",
                    outcome.removed.len(),
                    column,
                    method.as_str(),
                    threshold
                );
                (outcome.table, ActionType::OutliersRemoved, column.clone(), 0, message)
            }
            Self::CapOutliers {
                column,
                method,
                threshold,
            } => {
                let (method, threshold) = Self::outlier_settings(*method, *threshold, config);
                let (capped, count) = OutlierHandler::cap_outliers(table, column, method, threshold);
                let message = format!(
                    "Capped {} outliers in '{}' ({}, threshold {})",
                    count,
                    column,
                    method.as_str(),
                    threshold
                );
                (capped, ActionType::OutliersCapped, column.clone(), count, message)
            }
            Self::Transform { columns, transform } => {
                let transform = &transform.with_scale_range(config.scale_range);
                let outcome = ColumnTransformer::apply(table, columns, transform);
                let (action_type, message) = if transform.adds_columns() {
                    (
                        ActionType::ColumnsAdded,
                        format!(
                            "Added {} columns with {}",
                            outcome.columns_added.len(),
                            transform.name()
                        ),
                    )
                } else {
                    (
                        ActionType::ColumnTransformed,
                        format!(
                            "Applied {} to {} cells",
                            transform.name(),
                            outcome.cells_changed
                        ),
                    )
                };
                (
                    outcome.table,
                    action_type,
                    columns.join(", "),
                    outcome.cells_changed,
                    message,
                )
            }
        };

        let summary = OperationSummary {
            action_type,
            target,
            rows_before: table.len(),
            rows_after: result.len(),
            columns_before: table.width(),
            columns_after: result.width(),
            cells_changed,
            message,
        };

        Ok((result, summary))
    }
}

/// A JSON-described pipeline: engine settings plus an ordered operation list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelinePlan {
    #[serde(default)]
    pub config: EngineConfig,
    pub operations: Vec<Operation>,
}

impl PipelinePlan {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn sample() -> Table {
        Table::from_rows(
            ["id", "v"],
            [vec!["1", "10"], vec!["1", "10"], vec!["2", ""], vec!["3", "1000"]],
        )
    }

    #[test]
    fn test_deserialize_plan() {
        let json = r#"{
            "config": {"outlier_method": "iqr"},
            "operations": [
                {"op": "remove_duplicates", "keep": "min-nulls"},
                {"op": "handle_missing", "column": "v", "operation": {"kind": "fill-custom", "value": "0"}},
                {"op": "cap_outliers", "column": "v"},
                {"op": "transform", "columns": ["v"], "transform": {"kind": "scale", "min": 0.0, "max": 1.0}}
            ]
        }"#;
        let plan = PipelinePlan::from_json(json).unwrap();
        assert_eq!(plan.config.outlier_method, OutlierMethod::Iqr);
        assert_eq!(plan.operations.len(), 4);
        assert_eq!(
            plan.operations[0],
            Operation::RemoveDuplicates {
                columns: vec![],
                keep: Some(KeepStrategy::MinNulls)
            }
        );
        assert_eq!(
            plan.operations[1],
            Operation::HandleMissing {
                column: "v".to_string(),
                operation: MissingValueOperation::FillCustom("0".to_string())
            }
        );
    }

    #[test]
    fn test_apply_summary_counts() {
        let config = EngineConfig::default();
        let (table, summary) = Operation::RemoveDuplicates {
            columns: vec![],
            keep: None,
        }
        .apply(&sample(), &config)
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(summary.action_type, ActionType::DuplicatesRemoved);
        assert_eq!(summary.rows_removed(), 1);
        assert_eq!(summary.target, "table");
    }

    #[test]
    fn test_apply_fill_counts_cells() {
        let (table, summary) = Operation::HandleMissing {
            column: "v".to_string(),
            operation: MissingValueOperation::FillCustom("0".to_string()),
        }
        .apply(&sample(), &EngineConfig::default())
        .unwrap();
        assert_eq!(table.cell(2, "v"), Some(&Cell::from("0")));
        assert_eq!(summary.cells_changed, 1);
        assert_eq!(summary.action_type, ActionType::ValuesFilled);
    }

    #[test]
    fn test_apply_unknown_column() {
        let err = Operation::CapOutliers {
            column: "missing".to_string(),
            method: None,
            threshold: None,
        }
        .apply(&sample(), &EngineConfig::default())
        .unwrap_err();
        assert!(matches!(err, EngineError::ColumnNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let config = EngineConfig::default();
        let bad_regex = Operation::Transform {
            columns: vec!["v".to_string()],
            transform: Transform::RegexReplace {
                pattern: "([".to_string(),
                replacement: String::new(),
            },
        };
        assert!(matches!(
            bad_regex.validate(&config),
            Err(EngineError::InvalidPattern { .. })
        ));

        let bad_percentile = Operation::RemoveOutliers {
            column: "v".to_string(),
            method: Some(OutlierMethod::Percentile),
            threshold: Some(60.0),
        };
        assert!(matches!(
            bad_percentile.validate(&config),
            Err(EngineError::InvalidConfig(_))
        ));

        let bad_scale = Operation::Transform {
            columns: vec!["v".to_string()],
            transform: Transform::Scale {
                min: Some(1.0),
                max: Some(1.0),
            },
        };
        assert!(bad_scale.validate(&config).is_err());
    }

    #[test]
    fn test_configured_duplicate_columns_must_exist() {
        let config = EngineConfig::builder()
            .duplicate_columns(["idd"])
            .build()
            .unwrap();
        let operation = Operation::RemoveDuplicates {
            columns: vec![],
            keep: None,
        };
        assert_eq!(operation.columns(&config), vec!["idd"]);

        let err = operation.apply(&sample(), &config).unwrap_err();
        assert!(matches!(err, EngineError::ColumnNotFound(name) if name == "idd"));
    }

    #[test]
    fn test_explicit_duplicate_columns_override_config() {
        let config = EngineConfig::builder()
            .duplicate_columns(["idd"])
            .build()
            .unwrap();
        let operation = Operation::RemoveDuplicates {
            columns: vec!["id".to_string()],
            keep: None,
        };
        assert_eq!(operation.columns(&config), vec!["id"]);
        let (table, _) = operation.apply(&sample(), &config).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_scale_uses_configured_range() {
        let config = EngineConfig::builder().scale_range(-1.0, 1.0).build().unwrap();
        let table = Table::from_rows(["v"], [vec!["0"], vec!["5"], vec!["10"]]);
        let (scaled, summary) = Operation::Transform {
            columns: vec!["v".to_string()],
            transform: Transform::Scale {
                min: None,
                max: None,
            },
        }
        .apply(&table, &config)
        .unwrap();

        assert_eq!(
            scaled.column_cells("v"),
            vec![Cell::from("-1"), Cell::from("0"), Cell::from("1")]
        );
        assert_eq!(summary.cells_changed, 3);
    }

    #[test]
    fn test_validate_scale_against_configured_range() {
        let config = EngineConfig::builder().scale_range(0.0, 10.0).build().unwrap();
        // a lone min above the configured max leaves an empty range
        let inverted = Operation::Transform {
            columns: vec!["v".to_string()],
            transform: Transform::Scale {
                min: Some(20.0),
                max: None,
            },
        };
        assert!(matches!(
            inverted.validate(&config),
            Err(EngineError::InvalidConfig(_))
        ));

        let partial = Operation::Transform {
            columns: vec!["v".to_string()],
            transform: Transform::Scale {
                min: Some(5.0),
                max: None,
            },
        };
        assert!(partial.validate(&config).is_ok());
    }

    #[test]
    fn test_outlier_settings_fall_back_to_config() {
        let config = EngineConfig::builder()
            .outlier_method(OutlierMethod::Iqr)
            .outlier_threshold(3.0)
            .build()
            .unwrap();
        assert_eq!(
            Operation::outlier_settings(None, None, &config),
            (OutlierMethod::Iqr, 3.0)
        );
        // an explicit method uses its own default threshold
        assert_eq!(
            Operation::outlier_settings(Some(OutlierMethod::ZScore), None, &config),
            (OutlierMethod::ZScore, 3.0)
        );
        assert_eq!(
            Operation::outlier_settings(Some(OutlierMethod::Percentile), None, &config),
            (OutlierMethod::Percentile, 5.0)
        );
    }
}
