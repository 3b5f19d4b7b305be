//! Missing-value remediation.
//!
//! This module provides:
//! - Per-column missing-cell counts
//! - Row removal on a missing target cell
//! - Statistical fills (mean, median, mode) and constant fills

mod statistical;

pub use statistical::StatisticalImputer;

use crate::config::MissingValueOperation;
use crate::table::{Cell, Table, is_missing};
use crate::types::{FillOutcome, MissingValueSummary, RemovalOutcome};
use tracing::debug;

/// Outcome of applying a [`MissingValueOperation`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemediationOutcome {
    Removed(RemovalOutcome),
    Filled(FillOutcome),
}

impl RemediationOutcome {
    /// The resulting table.
    pub fn table(&self) -> &Table {
        match self {
            Self::Removed(outcome) => &outcome.table,
            Self::Filled(outcome) => &outcome.table,
        }
    }

    pub fn into_table(self) -> Table {
        match self {
            Self::Removed(outcome) => outcome.table,
            Self::Filled(outcome) => outcome.table,
        }
    }
}

/// Missing-value remediator for one target column at a time.
pub struct MissingValueImputer;

impl MissingValueImputer {
    /// Count missing cells for every header, in header order.
    pub fn missing_value_counts(table: &Table) -> Vec<MissingValueSummary> {
        let total = table.len();
        table
            .headers
            .iter()
            .map(|column| {
                let missing_count = table
                    .rows
                    .iter()
                    .filter(|row| is_missing(row.get(column.as_str())))
                    .count();
                let missing_percentage = if total == 0 {
                    0.0
                } else {
                    missing_count as f64 / total as f64 * 100.0
                };
                MissingValueSummary {
                    column: column.clone(),
                    missing_count,
                    missing_percentage,
                }
            })
            .collect()
    }

    /// Keep only the rows whose target cell is present.
    pub fn remove_rows(table: &Table, column: &str) -> RemovalOutcome {
        let outcome = RemovalOutcome::partition(table, |_, row| !is_missing(row.get(column)));
        debug!(
            "Removed {} rows with missing '{}'",
            outcome.removed.len(),
            column
        );
        outcome
    }

    /// Fill every missing target cell with the value the operation computes.
    ///
    /// Present cells, numeric or not, are left untouched. `RemoveRows` has
    /// no fill value and leaves the table unchanged; use [`Self::apply`] to
    /// dispatch on any operation.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabwash::{MissingValueImputer, MissingValueOperation, Table};
    ///
    /// let table = Table::from_rows(["v"], [vec!["1"], vec![""], vec!["2"], vec!["n/a"], vec!["3"]]);
    /// let outcome = MissingValueImputer::fill(&table, "v", &MissingValueOperation::FillMean);
    /// assert_eq!(outcome.fill_value, "2");
    /// assert_eq!(outcome.cells_filled, 2);
    /// ```
    pub fn fill(table: &Table, column: &str, operation: &MissingValueOperation) -> FillOutcome {
        let fill_value = StatisticalImputer::fill_value(table, column, operation);

        let (filled, cells_filled) = if matches!(operation, MissingValueOperation::RemoveRows) {
            (table.clone(), 0)
        } else {
            table.map_column(column, |cell| {
                is_missing(cell).then(|| Cell::Text(fill_value.clone()))
            })
        };

        debug!(
            "Filled {} missing cells in '{}' with '{}'",
            cells_filled, column, fill_value
        );

        FillOutcome {
            table: filled,
            fill_value,
            cells_filled,
        }
    }

    /// Apply any missing-value operation to one column.
    pub fn apply(
        table: &Table,
        column: &str,
        operation: &MissingValueOperation,
    ) -> RemediationOutcome {
        match operation {
            MissingValueOperation::RemoveRows => {
                RemediationOutcome::Removed(Self::remove_rows(table, column))
            }
            _ => RemediationOutcome::Filled(Self::fill(table, column, operation)),
        }
    }
}
