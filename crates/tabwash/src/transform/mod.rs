//! Column transforms.
//!
//! This module provides elementwise rewrites of one or more columns:
//! - Numeric rescaling (z-score, min-max, log, square root)
//! - Text normalization (case, trim, prefix/suffix, regex replace)
//! - Categorical encoding (one-hot, label)
//!
//! No transform adds or removes rows. Encodings append columns and keep
//! the source column.

pub mod categorical;
pub mod numeric;
pub mod text;

use crate::table::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Target range used by [`Transform::Scale`] when a bound is left unset.
pub const DEFAULT_SCALE_RANGE: (f64, f64) = (0.0, 1.0);

/// One column transform and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    Normalize,
    /// Min-max scaling; unset bounds fall back to the configured range.
    Scale {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Log,
    SquareRoot,
    Lowercase,
    Uppercase,
    Trim,
    AddPrefix { prefix: String },
    AddSuffix { suffix: String },
    RegexReplace { pattern: String, replacement: String },
    OneHotEncoding,
    LabelEncoding,
}

impl Transform {
    /// Snake-case transform name used in logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Scale { .. } => "scale",
            Self::Log => "log",
            Self::SquareRoot => "square_root",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
            Self::Trim => "trim",
            Self::AddPrefix { .. } => "add_prefix",
            Self::AddSuffix { .. } => "add_suffix",
            Self::RegexReplace { .. } => "regex_replace",
            Self::OneHotEncoding => "one_hot_encoding",
            Self::LabelEncoding => "label_encoding",
        }
    }

    /// Fill unset scale bounds from `range`; other transforms are returned as is.
    pub fn with_scale_range(&self, range: (f64, f64)) -> Self {
        match self {
            Self::Scale { min, max } => Self::Scale {
                min: Some(min.unwrap_or(range.0)),
                max: Some(max.unwrap_or(range.1)),
            },
            other => other.clone(),
        }
    }

    /// Whether the transform appends columns instead of rewriting cells.
    pub fn adds_columns(&self) -> bool {
        matches!(self, Self::OneHotEncoding | Self::LabelEncoding)
    }

    fn apply_one(&self, table: &Table, column: &str) -> TransformOutcome {
        match self {
            Self::Normalize => numeric::normalize(table, column),
            Self::Scale { min, max } => numeric::scale(
                table,
                column,
                min.unwrap_or(DEFAULT_SCALE_RANGE.0),
                max.unwrap_or(DEFAULT_SCALE_RANGE.1),
            ),
            Self::Log => numeric::log(table, column),
            Self::SquareRoot => numeric::square_root(table, column),
            Self::Lowercase => text::lowercase(table, column),
            Self::Uppercase => text::uppercase(table, column),
            Self::Trim => text::trim(table, column),
            Self::AddPrefix { prefix } => text::add_prefix(table, column, prefix),
            Self::AddSuffix { suffix } => text::add_suffix(table, column, suffix),
            Self::RegexReplace {
                pattern,
                replacement,
            } => text::regex_replace(table, column, pattern, replacement),
            Self::OneHotEncoding => categorical::one_hot_encoding(table, column),
            Self::LabelEncoding => categorical::label_encoding(table, column),
        }
    }
}

/// A transformed table and what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub table: Table,
    /// Cells rewritten in existing columns.
    pub cells_changed: usize,
    /// Names of appended columns, in header order.
    pub columns_added: Vec<String>,
}

impl TransformOutcome {
    pub(crate) fn rewritten(table: Table, cells_changed: usize) -> Self {
        Self {
            table,
            cells_changed,
            columns_added: Vec::new(),
        }
    }

    pub(crate) fn appended(table: Table, columns_added: Vec<String>) -> Self {
        Self {
            table,
            cells_changed: 0,
            columns_added,
        }
    }

    pub(crate) fn unchanged(table: &Table) -> Self {
        Self::rewritten(table.clone(), 0)
    }
}

/// Applies transforms across a list of columns.
pub struct ColumnTransformer;

impl ColumnTransformer {
    /// Apply a transform to each column in turn.
    ///
    /// Each column sees the table produced by the previous one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabwash::{ColumnTransformer, Table, Transform};
    ///
    /// let table = Table::from_rows(["a", "b"], [vec!["X", "Y"]]);
    /// let columns = vec!["a".to_string(), "b".to_string()];
    /// let outcome = ColumnTransformer::apply(&table, &columns, &Transform::Lowercase);
    /// assert_eq!(outcome.table.cell(0, "b").unwrap().to_text(), "y");
    /// ```
    pub fn apply(table: &Table, columns: &[String], transform: &Transform) -> TransformOutcome {
        let mut outcome = TransformOutcome::unchanged(table);

        for column in columns {
            let step = transform.apply_one(&outcome.table, column);
            outcome.table = step.table;
            outcome.cells_changed += step.cells_changed;
            outcome.columns_added.extend(step.columns_added);
        }

        debug!(
            "Applied {} to {} columns: {} cells changed, {} columns added",
            transform.name(),
            columns.len(),
            outcome.cells_changed,
            outcome.columns_added.len()
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn test_apply_multiple_columns_sequentially() {
        let table = Table::from_rows(["a", "b"], [vec!["1", "10"], vec!["3", "30"]]);
        let columns = vec!["a".to_string(), "b".to_string()];
        let outcome = ColumnTransformer::apply(&table, &columns, &Transform::Scale { min: Some(0.0), max: Some(1.0) });

        assert_eq!(outcome.table.column_cells("a"), vec![Cell::from("0"), Cell::from("1")]);
        assert_eq!(outcome.table.column_cells("b"), vec![Cell::from("0"), Cell::from("1")]);
        assert_eq!(outcome.cells_changed, 4);
        assert_eq!(outcome.table.len(), table.len());
    }

    #[test]
    fn test_apply_one_hot_over_two_columns() {
        let table = Table::from_rows(["a", "b"], [vec!["x", "p"], vec!["y", "p"]]);
        let columns = vec!["a".to_string(), "b".to_string()];
        let outcome = ColumnTransformer::apply(&table, &columns, &Transform::OneHotEncoding);
        assert_eq!(outcome.columns_added, vec!["a_x", "a_y", "b_p"]);
        assert_eq!(outcome.table.width(), 5);
    }

    #[test]
    fn test_transform_serde_shape() {
        let json = r#"{"kind":"regex_replace","pattern":"\\s+","replacement":" "}"#;
        let transform: Transform = serde_json::from_str(json).unwrap();
        assert_eq!(
            transform,
            Transform::RegexReplace {
                pattern: r"\s+".to_string(),
                replacement: " ".to_string()
            }
        );
        assert_eq!(transform.name(), "regex_replace");
        assert!(!transform.adds_columns());
        assert!(Transform::LabelEncoding.adds_columns());
    }

    #[test]
    fn test_scale_bounds_default_and_fill_from_range() {
        let transform: Transform = serde_json::from_str(r#"{"kind":"scale","max":10}"#).unwrap();
        assert_eq!(transform, Transform::Scale { min: None, max: Some(10.0) });
        assert_eq!(
            transform.with_scale_range((-1.0, 1.0)),
            Transform::Scale { min: Some(-1.0), max: Some(10.0) }
        );
        assert_eq!(Transform::Trim.with_scale_range((-1.0, 1.0)), Transform::Trim);

        // no range at all scales into [0, 1]
        let table = Table::from_rows(["a"], [vec!["2"], vec!["4"]]);
        let unset = Transform::Scale { min: None, max: None };
        let outcome = ColumnTransformer::apply(&table, &["a".to_string()], &unset);
        assert_eq!(outcome.table.column_cells("a"), vec![Cell::from("0"), Cell::from("1")]);
    }

    #[test]
    fn test_unknown_column_is_unchanged() {
        let table = Table::from_rows(["a"], [vec!["X"]]);
        let outcome = ColumnTransformer::apply(&table, &["zz".to_string()], &Transform::Normalize);
        assert_eq!(outcome.table, table);
    }
}
