use crate::config::{OutlierMethod, RegressionModel};
use crate::table::{Row, Table};
use serde::{Deserialize, Serialize};

// ============================================================================
// Statistics
// ============================================================================

/// Grouping used when rendering a statistics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatisticCategory {
    CentralTendency,
    Dispersion,
    DistributionShape,
    Basic,
}

impl StatisticCategory {
    /// Get a human-readable display name for the category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CentralTendency => "Central Tendency",
            Self::Dispersion => "Dispersion",
            Self::DistributionShape => "Distribution Shape",
            Self::Basic => "Basic",
        }
    }
}

/// A single number or string, as returned by `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
}

/// Value of one statistic. `Null` means undefined for the sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatisticValue {
    Null,
    Number(f64),
    Text(String),
    List(Vec<ScalarValue>),
}

impl StatisticValue {
    /// Wrap an optional number, mapping `None` to `Null`.
    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Number)
    }

    /// The numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// One named, categorized statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticResult {
    pub name: String,
    pub value: StatisticValue,
    pub category: StatisticCategory,
}

impl StatisticResult {
    pub fn new(name: impl Into<String>, value: StatisticValue, category: StatisticCategory) -> Self {
        Self {
            name: name.into(),
            value,
            category,
        }
    }
}

/// Outcome of the Jarque-Bera normality test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityTest {
    pub statistic: f64,
    pub p_value: f64,
    /// `true` when `p_value >= 0.05`.
    pub is_normal: bool,
}

// ============================================================================
// Duplicates
// ============================================================================

/// Rows sharing one composite key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Trimmed key-column values joined with `|`.
    pub key: String,
    /// Original row positions, first occurrence first.
    pub indices: Vec<usize>,
    pub rows: Vec<Row>,
    /// Always equal to `indices.len()`, at least 2.
    pub count: usize,
}

/// Result of a duplicate check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub total_rows: usize,
    pub unique_rows: usize,
    /// `total_rows - unique_rows`; the only duplicate count the engine reports.
    pub duplicate_rows: usize,
    pub duplicate_groups_count: usize,
    pub groups: Vec<DuplicateGroup>,
}

// ============================================================================
// Row Removal
// ============================================================================

/// A filtered table together with the classification of every input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    pub table: Table,
    /// Input indices that survived, ascending.
    pub kept: Vec<usize>,
    /// Input indices that were dropped, ascending.
    pub removed: Vec<usize>,
}

impl RemovalOutcome {
    /// Filter `table` by a per-index keep decision.
    pub(crate) fn partition<F>(table: &Table, mut keep: F) -> Self
    where
        F: FnMut(usize, &Row) -> bool,
    {
        let mut kept = Vec::new();
        let mut removed = Vec::new();
        let filtered = table.filter_rows(|idx, row| {
            let keep_row = keep(idx, row);
            if keep_row {
                kept.push(idx);
            } else {
                removed.push(idx);
            }
            keep_row
        });
        Self {
            table: filtered,
            kept,
            removed,
        }
    }
}

// ============================================================================
// Missing Values
// ============================================================================

/// Missing-cell count for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueSummary {
    pub column: String,
    pub missing_count: usize,
    /// Percentage of rows (0 - 100). Zero for an empty table.
    pub missing_percentage: f64,
}

/// Result of a fill operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillOutcome {
    pub table: Table,
    /// The string written into each missing cell.
    pub fill_value: String,
    pub cells_filled: usize,
}

// ============================================================================
// Outliers
// ============================================================================

/// Method-specific values behind a pair of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodDetails {
    ZScore { mean: f64, std_dev: f64 },
    Iqr { q1: f64, q3: f64, iqr: f64 },
    Percentile { lower_percentile: f64, upper_percentile: f64 },
}

/// Lower and upper bound beyond which a value is an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub method: OutlierMethod,
    pub threshold: f64,
    pub method_details: MethodDetails,
}

/// Bounds plus the rows they flag in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub column: String,
    pub bounds: OutlierBounds,
    /// Flagged row indices, ascending.
    pub outlier_indices: Vec<usize>,
    /// Number of numeric cells examined.
    pub values_checked: usize,
}

// ============================================================================
// Regression
// ============================================================================

/// Fitted model and fit-quality metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub model: RegressionModel,
    pub equation: String,
    pub r2: f64,
    pub adjusted_r2: f64,
    pub standard_error: f64,
    pub observations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercept: Option<f64>,
    /// Intercept first, then one coefficient per predictor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<f64>>,
}

// ============================================================================
// Pipeline Summary Types
// ============================================================================

/// Kind of change an operation made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Duplicate rows were dropped.
    DuplicatesRemoved,
    /// Rows with a missing target cell were dropped.
    RowsRemoved,
    /// Missing cells were filled.
    ValuesFilled,
    /// Outlier rows were dropped.
    OutliersRemoved,
    /// Outlier cells were clamped to their bounds.
    OutliersCapped,
    /// A column was rewritten in place.
    ColumnTransformed,
    /// New encoded columns were appended.
    ColumnsAdded,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::RowsRemoved => "Rows Removed",
            Self::ValuesFilled => "Values Filled",
            Self::OutliersRemoved => "Outliers Removed",
            Self::OutliersCapped => "Outliers Capped",
            Self::ColumnTransformed => "Column Transformed",
            Self::ColumnsAdded => "Columns Added",
        }
    }
}

/// What one pipeline step did to the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub action_type: ActionType,
    /// Column name, or "table" for whole-table operations.
    pub target: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// Cells rewritten in place (fills, caps, transforms).
    pub cells_changed: usize,
    /// Human-readable description of the step.
    pub message: String,
}

impl OperationSummary {
    /// Number of rows removed by the step.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Number of columns added by the step.
    pub fn columns_added(&self) -> usize {
        self.columns_after.saturating_sub(self.columns_before)
    }
}

/// Final table and step log of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub table: Table,
    pub steps: Vec<OperationSummary>,
    pub duration_ms: u64,
    /// Local time the run finished, `%Y-%m-%d %H:%M:%S`.
    pub generated_at: String,
}

impl PipelineResult {
    /// Total rows removed across all steps.
    pub fn rows_removed(&self) -> usize {
        self.steps.iter().map(OperationSummary::rows_removed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistic_value_serialization() {
        assert_eq!(serde_json::to_string(&StatisticValue::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&StatisticValue::Number(2.5)).unwrap(), "2.5");
        let list = StatisticValue::List(vec![
            ScalarValue::Number(1.0),
            ScalarValue::Text("a".to_string()),
        ]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"[1.0,"a"]"#);
    }

    #[test]
    fn test_statistic_value_from_option() {
        assert!(StatisticValue::from_option(None).is_null());
        assert_eq!(StatisticValue::from_option(Some(3.0)).as_f64(), Some(3.0));
    }

    #[test]
    fn test_removal_outcome_partition() {
        let table = Table::from_rows(["v"], [vec!["a"], vec!["b"], vec!["c"]]);
        let outcome = RemovalOutcome::partition(&table, |idx, _| idx != 1);
        assert_eq!(outcome.kept, vec![0, 2]);
        assert_eq!(outcome.removed, vec![1]);
        assert_eq!(outcome.table.len(), 2);
    }

    #[test]
    fn test_action_type_serialization() {
        let json = serde_json::to_string(&ActionType::OutliersCapped).unwrap();
        assert_eq!(json, "\"outliers_capped\"");
        assert_eq!(ActionType::ValuesFilled.display_name(), "Values Filled");
    }

    #[test]
    fn test_operation_summary_counts() {
        let summary = OperationSummary {
            action_type: ActionType::ColumnsAdded,
            target: "color".to_string(),
            rows_before: 3,
            rows_after: 3,
            columns_before: 1,
            columns_after: 3,
            cells_changed: 0,
            message: "One-hot encoded 'color'".to_string(),
        };
        assert_eq!(summary.rows_removed(), 0);
        assert_eq!(summary.columns_added(), 2);
    }
}
