//! Duplicate detection and removal by composite key.

use crate::config::KeepStrategy;
use crate::table::{Row, Table, is_missing};
use crate::types::{DuplicateGroup, DuplicateReport, RemovalOutcome};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Separator between key-column values in a composite key.
pub const KEY_SEPARATOR: &str = "|";

/// Duplicate detector for composite-key row grouping.
pub struct DuplicateDetector;

impl DuplicateDetector {
    /// Composite key of one row: each key column's trimmed string form, or
    /// the empty string when missing, joined with `|`.
    pub fn row_key(row: &Row, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| {
                let cell = row.get(column.as_str());
                match cell {
                    Some(cell) if !is_missing(Some(cell)) => cell.to_text().trim().to_string(),
                    _ => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR)
    }

    /// Group every row by its composite key.
    ///
    /// Returns `(key, indices)` pairs ordered by first appearance. An empty
    /// `columns` slice keys on every header.
    fn group_rows(table: &Table, columns: &[String]) -> Vec<(String, Vec<usize>)> {
        let key_columns = Self::key_columns(table, columns);

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

        for (idx, row) in table.rows.iter().enumerate() {
            let key = Self::row_key(row, key_columns);
            match positions.get(&key) {
                Some(&pos) => groups[pos].1.push(idx),
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push((key, vec![idx]));
                }
            }
        }

        groups
    }

    fn key_columns<'a>(table: &'a Table, columns: &'a [String]) -> &'a [String] {
        if columns.is_empty() {
            &table.headers
        } else {
            columns
        }
    }

    /// Find duplicate groups over the given key columns.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabwash::{DuplicateDetector, Table};
    ///
    /// let table = Table::from_rows(["a", "b"], [vec!["x", "1"], vec!["x", "1"], vec!["y", "2"]]);
    /// let report = DuplicateDetector::find_duplicates(&table, &["a".to_string(), "b".to_string()]);
    /// assert_eq!(report.duplicate_rows, 1);
    /// assert_eq!(report.groups[0].indices, vec![0, 1]);
    /// ```
    pub fn find_duplicates(table: &Table, columns: &[String]) -> DuplicateReport {
        let grouped = Self::group_rows(table, columns);
        let unique_rows = grouped.len();

        let groups: Vec<DuplicateGroup> = grouped
            .into_iter()
            .filter(|(_, indices)| indices.len() > 1)
            .map(|(key, indices)| DuplicateGroup {
                rows: indices.iter().map(|&i| table.rows[i].clone()).collect(),
                count: indices.len(),
                key,
                indices,
            })
            .collect();

        let report = DuplicateReport {
            total_rows: table.len(),
            unique_rows,
            duplicate_rows: table.len() - unique_rows,
            duplicate_groups_count: groups.len(),
            groups,
        };

        debug!(
            "Found {} duplicate rows in {} groups",
            report.duplicate_rows, report.duplicate_groups_count
        );

        report
    }

    /// Remove duplicates, keeping one member of each group.
    ///
    /// Survivors keep their original relative order. Applying the removal to
    /// its own output changes nothing.
    pub fn remove_duplicates(
        table: &Table,
        columns: &[String],
        keep: KeepStrategy,
    ) -> RemovalOutcome {
        let survivors: HashSet<usize> = Self::group_rows(table, columns)
            .iter()
            .map(|(_, indices)| Self::survivor(table, indices, keep))
            .collect();

        let outcome = RemovalOutcome::partition(table, |idx, _| survivors.contains(&idx));

        debug!(
            "Removed {} duplicate rows (keep = {:?})",
            outcome.removed.len(),
            keep
        );

        outcome
    }

    /// The member of a group that survives removal.
    fn survivor(table: &Table, indices: &[usize], keep: KeepStrategy) -> usize {
        match keep {
            KeepStrategy::First => indices[0],
            KeepStrategy::Last => indices[indices.len() - 1],
            KeepStrategy::MinNulls => {
                // min_by_key returns the last minimum; fold keeps the earliest
                indices
                    .iter()
                    .map(|&idx| (idx, table.missing_in_row(&table.rows[idx])))
                    .fold(None, |best: Option<(usize, usize)>, (idx, nulls)| match best {
                        Some((_, best_nulls)) if best_nulls <= nulls => best,
                        _ => Some((idx, nulls)),
                    })
                    .map_or(indices[0], |(idx, _)| idx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn scenario() -> Table {
        Table::from_rows(["a", "b"], [vec!["x", "1"], vec!["x", "1"], vec!["y", "2"]])
    }

    #[test]
    fn test_find_duplicates_basic_group() {
        let report = DuplicateDetector::find_duplicates(&scenario(), &cols(&["a", "b"]));

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.unique_rows, 2);
        assert_eq!(report.duplicate_rows, 1);
        assert_eq!(report.duplicate_groups_count, 1);
        assert_eq!(report.groups[0].key, "x|1");
        assert_eq!(report.groups[0].indices, vec![0, 1]);
        assert_eq!(report.groups[0].count, 2);
        assert_eq!(report.groups[0].rows.len(), 2);
    }

    #[test]
    fn test_key_trims_and_blanks_missing() {
        let table = Table::from_rows(
            ["a", "b"],
            [vec![" x ", "n/a"], vec!["x", ""], vec!["x", "NULL"]],
        );
        let report = DuplicateDetector::find_duplicates(&table, &cols(&["a", "b"]));
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].key, "x|");
        assert_eq!(report.groups[0].indices, vec![0, 1, 2]);
        assert_eq!(report.duplicate_rows, 2);
    }

    #[test]
    fn test_empty_columns_use_all_headers() {
        let table = Table::from_rows(["a", "b"], [vec!["x", "1"], vec!["x", "2"], vec!["x", "1"]]);
        let report = DuplicateDetector::find_duplicates(&table, &[]);
        assert_eq!(report.groups[0].indices, vec![0, 2]);
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let table = Table::from_rows(["k"], [vec!["b"], vec!["a"], vec!["b"], vec!["a"]]);
        let report = DuplicateDetector::find_duplicates(&table, &cols(&["k"]));
        let keys: Vec<&str> = report.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_number_and_text_cells_share_key() {
        let table = Table::new(
            cols(&["v"]),
            vec![
                Row::from([("v".to_string(), Cell::Number(2.0))]),
                Row::from([("v".to_string(), Cell::from("2"))]),
            ],
        );
        let report = DuplicateDetector::find_duplicates(&table, &cols(&["v"]));
        assert_eq!(report.duplicate_rows, 1);
    }

    #[test]
    fn test_remove_keep_first_and_last() {
        let table = scenario();
        let first = DuplicateDetector::remove_duplicates(&table, &cols(&["a"]), KeepStrategy::First);
        assert_eq!(first.kept, vec![0, 2]);
        assert_eq!(first.removed, vec![1]);

        let last = DuplicateDetector::remove_duplicates(&table, &cols(&["a"]), KeepStrategy::Last);
        assert_eq!(last.kept, vec![1, 2]);
        assert_eq!(last.removed, vec![0]);
    }

    #[test]
    fn test_remove_keep_min_nulls() {
        let table = Table::from_rows(
            ["k", "a", "b"],
            [
                vec!["1", "", ""],
                vec!["1", "x", ""],
                vec!["1", "x", "y"],
                vec!["1", "p", "q"],
            ],
        );
        let outcome =
            DuplicateDetector::remove_duplicates(&table, &cols(&["k"]), KeepStrategy::MinNulls);
        // rows 2 and 3 tie at zero missing cells; the earlier one wins
        assert_eq!(outcome.kept, vec![2]);
        assert_eq!(outcome.removed, vec![0, 1, 3]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let table = Table::from_rows(
            ["k", "v"],
            [vec!["a", "1"], vec!["b", ""], vec!["a", "2"], vec!["b", "3"]],
        );
        for keep in [KeepStrategy::First, KeepStrategy::Last, KeepStrategy::MinNulls] {
            let once = DuplicateDetector::remove_duplicates(&table, &cols(&["k"]), keep);
            let twice = DuplicateDetector::remove_duplicates(&once.table, &cols(&["k"]), keep);
            assert_eq!(once.table, twice.table);
            assert!(twice.removed.is_empty());
        }
    }

    #[test]
    fn test_no_duplicates() {
        let table = Table::from_rows(["k"], [vec!["a"], vec!["b"]]);
        let report = DuplicateDetector::find_duplicates(&table, &cols(&["k"]));
        assert_eq!(report.duplicate_rows, 0);
        assert!(report.groups.is_empty());

        let empty = DuplicateDetector::find_duplicates(&Table::default(), &cols(&["k"]));
        assert_eq!(empty.total_rows, 0);
        assert_eq!(empty.unique_rows, 0);
    }
}
