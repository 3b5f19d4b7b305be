//! String rewriting of one column.

use super::TransformOutcome;
use crate::table::{Cell, Table};
use regex::Regex;
use tracing::warn;

/// Rewrite the string form of every present cell, counting real changes.
fn map_text<F>(table: &Table, column: &str, mut f: F) -> TransformOutcome
where
    F: FnMut(&str) -> String,
{
    let (table, cells_changed) = table.map_column(column, |cell| {
        let cell = cell.filter(|c| !c.is_missing())?;
        let before = cell.to_text();
        let after = f(&before);
        (after != before).then_some(Cell::Text(after))
    });
    TransformOutcome::rewritten(table, cells_changed)
}

pub fn lowercase(table: &Table, column: &str) -> TransformOutcome {
    map_text(table, column, str::to_lowercase)
}

pub fn uppercase(table: &Table, column: &str) -> TransformOutcome {
    map_text(table, column, str::to_uppercase)
}

pub fn trim(table: &Table, column: &str) -> TransformOutcome {
    map_text(table, column, |s| s.trim().to_string())
}

pub fn add_prefix(table: &Table, column: &str, prefix: &str) -> TransformOutcome {
    map_text(table, column, |s| format!("{}{}", prefix, s))
}

pub fn add_suffix(table: &Table, column: &str, suffix: &str) -> TransformOutcome {
    map_text(table, column, |s| format!("{}{}", s, suffix))
}

/// Replace every match of `pattern`.
///
/// An invalid pattern logs a warning and returns the table unchanged.
pub fn regex_replace(
    table: &Table,
    column: &str,
    pattern: &str,
    replacement: &str,
) -> TransformOutcome {
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("Skipping regex replace on '{}': invalid pattern '{}': {}", column, pattern, e);
            return TransformOutcome::unchanged(table);
        }
    };
    map_text(table, column, |s| re.replace_all(s, replacement).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> Table {
        Table::from_rows(["v"], values.iter().map(|v| vec![*v]))
    }

    fn texts(table: &Table) -> Vec<String> {
        table.column_cells("v").iter().map(Cell::to_text).collect()
    }

    #[test]
    fn test_case_and_trim() {
        let table = column(&[" Hello ", "WORLD", "n/a"]);
        assert_eq!(texts(&lowercase(&table, "v").table), vec![" hello ", "world", "n/a"]);
        assert_eq!(texts(&uppercase(&table, "v").table), vec![" HELLO ", "WORLD", "n/a"]);

        let trimmed = trim(&table, "v");
        assert_eq!(texts(&trimmed.table), vec!["Hello", "WORLD", "n/a"]);
        assert_eq!(trimmed.cells_changed, 1);
    }

    #[test]
    fn test_prefix_suffix_skip_missing() {
        let table = column(&["a", "", "b"]);
        assert_eq!(texts(&add_prefix(&table, "v", "x-").table), vec!["x-a", "", "x-b"]);
        assert_eq!(texts(&add_suffix(&table, "v", "!").table), vec!["a!", "", "b!"]);
    }

    #[test]
    fn test_regex_replace_global() {
        let table = column(&["a1b22c", "none"]);
        let outcome = regex_replace(&table, "v", r"\d+", "#");
        assert_eq!(texts(&outcome.table), vec!["a#b#c", "none"]);
        assert_eq!(outcome.cells_changed, 1);

        let groups = regex_replace(&column(&["2024-01"]), "v", r"(\d+)-(\d+)", "$2/$1");
        assert_eq!(texts(&groups.table), vec!["01/2024"]);
    }

    #[test]
    fn test_regex_replace_invalid_pattern_is_noop() {
        let table = column(&["abc"]);
        let outcome = regex_replace(&table, "v", "([", "x");
        assert_eq!(outcome.table, table);
        assert_eq!(outcome.cells_changed, 0);
    }

    #[test]
    fn test_numbers_are_rewritten_as_text() {
        let table = Table::new(
            vec!["v".to_string()],
            vec![[("v".to_string(), Cell::Number(5.0))].into_iter().collect()],
        );
        let outcome = add_suffix(&table, "v", "kg");
        assert_eq!(outcome.table.cell(0, "v"), Some(&Cell::from("5kg")));
    }
}
