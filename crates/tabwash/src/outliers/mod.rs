//! Outlier detection and treatment.
//!
//! Bounds are computed over the numeric projection of one column with one of
//! three strategies (see [`OutlierMethod`]). Flagged rows can then be
//! removed, or their cells clamped to the nearer bound.

mod bounds;

pub use bounds::{compute_bounds, is_outlier};

use crate::config::OutlierMethod;
use crate::table::{Cell, Table, numeric_value};
use crate::types::{OutlierReport, RemovalOutcome};
use std::collections::HashSet;
use tracing::debug;

/// Handles outlier detection and treatment for one column at a time.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Compute bounds for a column and list the rows they flag.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabwash::{OutlierHandler, OutlierMethod, Table};
    ///
    /// let table = Table::from_rows(["v"], [vec!["1"], vec!["2"], vec!["3"], vec!["100"]]);
    /// let report = OutlierHandler::detect(&table, "v", OutlierMethod::ZScore, 1.0);
    /// assert_eq!(report.outlier_indices, vec![3]);
    /// ```
    pub fn detect(
        table: &Table,
        column: &str,
        method: OutlierMethod,
        threshold: f64,
    ) -> OutlierReport {
        let indexed = table.indexed_numeric_column(column);
        let values: Vec<f64> = indexed.iter().map(|(_, v)| *v).collect();
        let bounds = compute_bounds(&values, method, threshold);

        let outlier_indices: Vec<usize> = if values.is_empty() {
            Vec::new()
        } else {
            indexed
                .iter()
                .filter(|(_, v)| is_outlier(&bounds, *v))
                .map(|(idx, _)| *idx)
                .collect()
        };

        debug!(
            "Detected {} outliers in '{}' ({}, threshold {})",
            outlier_indices.len(),
            column,
            method.as_str(),
            threshold
        );

        OutlierReport {
            column: column.to_string(),
            bounds,
            outlier_indices,
            values_checked: values.len(),
        }
    }

    /// Drop every row flagged as an outlier.
    pub fn remove_outliers(
        table: &Table,
        column: &str,
        method: OutlierMethod,
        threshold: f64,
    ) -> RemovalOutcome {
        let report = Self::detect(table, column, method, threshold);
        let flagged: HashSet<usize> = report.outlier_indices.into_iter().collect();

        let outcome = RemovalOutcome::partition(table, |idx, _| !flagged.contains(&idx));
        debug!("Removed {} outlier rows", outcome.removed.len());
        outcome
    }

    /// Clamp flagged cells to the nearer bound.
    ///
    /// Returns the new table and the number of cells capped. Capped values
    /// are written as formatted text.
    pub fn cap_outliers(
        table: &Table,
        column: &str,
        method: OutlierMethod,
        threshold: f64,
    ) -> (Table, usize) {
        let report = Self::detect(table, column, method, threshold);
        let bounds = report.bounds;
        let flagged: HashSet<usize> = report.outlier_indices.into_iter().collect();

        let mut row_idx = 0;
        let (capped, count) = table.map_column(column, |cell| {
            let idx = row_idx;
            row_idx += 1;
            if !flagged.contains(&idx) {
                return None;
            }
            let value = numeric_value(cell)?;
            let bound = if value > bounds.upper_bound {
                bounds.upper_bound
            } else {
                bounds.lower_bound
            };
            Some(Cell::from_number(bound))
        });

        debug!(
            "Capped {} outliers in '{}' to [{}, {}]",
            count, column, bounds.lower_bound, bounds.upper_bound
        );

        (capped, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::format_number;
    use pretty_assertions::assert_eq;

    fn scenario() -> Table {
        Table::from_rows(["v"], [vec!["1"], vec!["2"], vec!["3"], vec!["100"]])
    }

    #[test]
    fn test_detect_zscore_scenario() {
        let report = OutlierHandler::detect(&scenario(), "v", OutlierMethod::ZScore, 1.0);
        assert_eq!(report.outlier_indices, vec![3]);
        assert_eq!(report.values_checked, 4);
        assert_eq!(report.column, "v");
    }

    #[test]
    fn test_cap_replaces_with_upper_bound() {
        let table = scenario();
        let report = OutlierHandler::detect(&table, "v", OutlierMethod::ZScore, 1.0);
        let (capped, count) = OutlierHandler::cap_outliers(&table, "v", OutlierMethod::ZScore, 1.0);

        assert_eq!(count, 1);
        assert_eq!(
            capped.cell(3, "v"),
            Some(&Cell::Text(format_number(report.bounds.upper_bound)))
        );
        assert_eq!(capped.cell(0, "v"), Some(&Cell::from("1")));
    }

    #[test]
    fn test_cap_low_outlier_uses_lower_bound() {
        let table = Table::from_rows(
            ["v"],
            [vec!["-50"], vec!["10"], vec!["11"], vec!["12"], vec!["13"], vec!["14"], vec!["15"], vec!["16"]],
        );
        let (capped, count) = OutlierHandler::cap_outliers(&table, "v", OutlierMethod::Iqr, 1.5);
        // q1 = sorted[2] = 11, q3 = sorted[6] = 15, lower = 5
        assert_eq!(count, 1);
        assert_eq!(capped.cell(0, "v"), Some(&Cell::from("5")));
    }

    #[test]
    fn test_remove_outliers_keeps_non_numeric_rows() {
        let table = Table::from_rows(
            ["id", "v"],
            [vec!["a", "1"], vec!["b", "x"], vec!["c", "2"], vec!["d", "3"], vec!["e", "100"]],
        );
        let outcome = OutlierHandler::remove_outliers(&table, "v", OutlierMethod::ZScore, 1.0);
        assert_eq!(outcome.removed, vec![4]);
        assert_eq!(outcome.kept, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_projection_flags_nothing() {
        let table = Table::from_rows(["v"], [vec!["a"], vec![""]]);
        for method in [OutlierMethod::ZScore, OutlierMethod::Iqr, OutlierMethod::Percentile] {
            let report = OutlierHandler::detect(&table, "v", method, method.default_threshold());
            assert!(report.outlier_indices.is_empty());
            assert_eq!(report.values_checked, 0);
        }
        let (capped, count) = OutlierHandler::cap_outliers(&table, "v", OutlierMethod::Iqr, 1.5);
        assert_eq!(count, 0);
        assert_eq!(capped, table);
    }

    #[test]
    fn test_wider_threshold_flags_subset() {
        let table = Table::from_rows(
            ["v"],
            ["1", "4", "5", "6", "7", "9", "30", "-20", "60"].map(|v| vec![v]),
        );
        for method in [OutlierMethod::ZScore, OutlierMethod::Iqr] {
            let narrow = OutlierHandler::detect(&table, "v", method, 0.5);
            let wide = OutlierHandler::detect(&table, "v", method, 2.0);
            let narrow_set: HashSet<usize> = narrow.outlier_indices.into_iter().collect();
            assert!(wide.outlier_indices.iter().all(|i| narrow_set.contains(i)));
        }
    }
}
