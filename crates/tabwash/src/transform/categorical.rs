//! Categorical encodings that append new columns.

use super::TransformOutcome;
use crate::table::{Cell, Table, is_missing};
use tracing::warn;

/// Distinct string forms of the present cells, in first-seen order.
fn categories(table: &Table, column: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for row in &table.rows {
        let cell = row.get(column);
        if is_missing(cell) {
            continue;
        }
        let value = cell.map(Cell::to_text).unwrap_or_default();
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// The category of a row's cell, `None` when missing.
fn category_of(cell: Option<&Cell>) -> Option<String> {
    cell.filter(|c| !c.is_missing()).map(Cell::to_text)
}

/// Add one `{column}_{value}` indicator column per category.
///
/// Indicators hold `"1"` or `"0"`; the source column is kept. A category
/// whose indicator name is already a header is skipped so existing data
/// is never overwritten.
pub fn one_hot_encoding(table: &Table, column: &str) -> TransformOutcome {
    let (categories, new_columns): (Vec<String>, Vec<String>) = categories(table, column)
        .into_iter()
        .map(|value| {
            let name = format!("{}_{}", column, value);
            (value, name)
        })
        .filter(|(_, name)| {
            let clashes = table.has_column(name);
            if clashes {
                warn!("One-hot column '{}' already exists, skipping it", name);
            }
            !clashes
        })
        .unzip();

    let mut encoded = table.clone();
    for row in &mut encoded.rows {
        let category = category_of(row.get(column));
        for (value, name) in categories.iter().zip(&new_columns) {
            let flag = if category.as_deref() == Some(value.as_str()) { "1" } else { "0" };
            row.insert(name.clone(), Cell::from(flag));
        }
    }
    for name in &new_columns {
        encoded.push_header(name);
    }

    TransformOutcome::appended(encoded, new_columns)
}

/// Add `{column}_encoded` holding each category's first-seen index.
///
/// Missing cells encode as the empty string. The table is returned
/// unchanged when `{column}_encoded` is already a header.
pub fn label_encoding(table: &Table, column: &str) -> TransformOutcome {
    let name = format!("{}_encoded", column);
    if table.has_column(&name) {
        warn!("Label column '{}' already exists, leaving the table unchanged", name);
        return TransformOutcome::unchanged(table);
    }
    let categories = categories(table, column);

    let mut encoded = table.clone();
    for row in &mut encoded.rows {
        let label = category_of(row.get(column))
            .and_then(|value| categories.iter().position(|c| *c == value))
            .map(|idx| idx.to_string())
            .unwrap_or_default();
        row.insert(name.clone(), Cell::Text(label));
    }
    encoded.push_header(&name);

    TransformOutcome::appended(encoded, vec![name])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn colors() -> Table {
        Table::from_rows(["color"], [vec!["red"], vec!["blue"], vec!["red"]])
    }

    #[test]
    fn test_one_hot_scenario() {
        let outcome = one_hot_encoding(&colors(), "color");
        assert_eq!(outcome.table.headers, vec!["color", "color_red", "color_blue"]);
        assert_eq!(
            outcome.table.column_cells("color_red"),
            vec![Cell::from("1"), Cell::from("0"), Cell::from("1")]
        );
        assert_eq!(
            outcome.table.column_cells("color_blue"),
            vec![Cell::from("0"), Cell::from("1"), Cell::from("0")]
        );
        assert_eq!(outcome.table.column_cells("color"), colors().column_cells("color"));
        assert_eq!(outcome.columns_added, vec!["color_red", "color_blue"]);
    }

    #[test]
    fn test_one_hot_missing_rows_are_all_zero() {
        let table = Table::from_rows(["c"], [vec!["a"], vec!["n/a"]]);
        let outcome = one_hot_encoding(&table, "c");
        assert_eq!(outcome.table.headers, vec!["c", "c_a"]);
        assert_eq!(outcome.table.cell(1, "c_a"), Some(&Cell::from("0")));
    }

    #[test]
    fn test_label_encoding() {
        let table = Table::from_rows(["c"], [vec!["b"], vec!["a"], vec![""], vec!["b"]]);
        let outcome = label_encoding(&table, "c");
        assert_eq!(outcome.table.headers, vec!["c", "c_encoded"]);
        assert_eq!(
            outcome.table.column_cells("c_encoded"),
            vec![Cell::from("0"), Cell::from("1"), Cell::from(""), Cell::from("0")]
        );
        assert_eq!(outcome.table.len(), table.len());
    }

    #[test]
    fn test_one_hot_skips_existing_header() {
        let table = Table::from_rows(
            ["color", "color_red"],
            [vec!["red", "keep"], vec!["blue", "me"]],
        );
        let outcome = one_hot_encoding(&table, "color");

        assert_eq!(outcome.columns_added, vec!["color_blue"]);
        assert_eq!(outcome.table.headers, vec!["color", "color_red", "color_blue"]);
        assert_eq!(
            outcome.table.column_cells("color_red"),
            vec![Cell::from("keep"), Cell::from("me")]
        );
        assert_eq!(
            outcome.table.column_cells("color_blue"),
            vec![Cell::from("0"), Cell::from("1")]
        );
    }

    #[test]
    fn test_label_encoding_keeps_existing_column() {
        let table = Table::from_rows(["c", "c_encoded"], [vec!["a", "x"], vec!["b", "y"]]);
        let outcome = label_encoding(&table, "c");

        assert_eq!(outcome.table, table);
        assert!(outcome.columns_added.is_empty());
    }
}
