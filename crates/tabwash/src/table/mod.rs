//! In-memory table model.
//!
//! A [`Table`] is an ordered list of [`Row`]s plus the ordered header list
//! that names its columns. Engine operations never mutate a table they are
//! given; they build and return a new one.

mod cell;

pub use cell::{Cell, is_missing, numeric_value};

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One record: column name to cell. Absent keys read as missing.
pub type Row = HashMap<String, Cell>;

/// An ordered sequence of rows sharing a column set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Column names in display order.
    pub headers: Vec<String>,
    /// Rows in their original order.
    pub rows: Vec<Row>,
}

static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// Create a table from headers and already-built rows.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from positional rows; cell `i` of each row belongs to header `i`.
    ///
    /// Rows shorter than the header list leave the trailing keys absent.
    ///
    /// ```rust
    /// use tabwash::Table;
    ///
    /// let table = Table::from_rows(["a", "b"], [vec!["x", "1"], vec!["y"]]);
    /// assert_eq!(table.len(), 2);
    /// assert!(table.cell(1, "b").is_none());
    /// ```
    pub fn from_rows<H, R, C>(
        headers: impl IntoIterator<Item = H>,
        rows: impl IntoIterator<Item = R>,
    ) -> Self
    where
        H: Into<String>,
        R: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| {
                headers
                    .iter()
                    .cloned()
                    .zip(row.into_iter().map(Into::into))
                    .collect::<Row>()
            })
            .collect();
        Self { headers, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Check if a column is named in the headers.
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Return `ColumnNotFound` unless the column exists.
    pub fn require_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(EngineError::ColumnNotFound(name.to_string()))
        }
    }

    /// The cell at a position, `None` when the row or key is absent.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// All cells of a column in row order; absent keys become [`Cell::Null`].
    pub fn column_cells(&self, column: &str) -> Vec<Cell> {
        self.rows
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or_default())
            .collect()
    }

    /// The numeric projection of a column: coercible values in row order.
    pub fn numeric_column(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| numeric_value(row.get(column)))
            .collect()
    }

    /// The numeric projection of a column paired with original row indices.
    pub fn indexed_numeric_column(&self, column: &str) -> Vec<(usize, f64)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| numeric_value(row.get(column)).map(|v| (idx, v)))
            .collect()
    }

    /// Number of missing cells in a row across every header.
    pub fn missing_in_row(&self, row: &Row) -> usize {
        self.headers
            .iter()
            .filter(|h| is_missing(row.get(h.as_str())))
            .count()
    }

    /// Keep the rows whose index the predicate accepts, in their original order.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(usize, &Row) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, row)| keep(*idx, row))
            .map(|(_, row)| row.clone())
            .collect();
        Table::new(self.headers.clone(), rows)
    }

    /// Rewrite one column cell by cell.
    ///
    /// The closure receives the current cell (`None` when absent) and returns
    /// `Some(new)` to replace it or `None` to leave it untouched. Returns the
    /// new table and the number of cells rewritten.
    pub fn map_column<F>(&self, column: &str, mut f: F) -> (Table, usize)
    where
        F: FnMut(Option<&Cell>) -> Option<Cell>,
    {
        let mut changed = 0;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if let Some(new_cell) = f(row.get(column)) {
                    row.insert(column.to_string(), new_cell);
                    changed += 1;
                }
                row
            })
            .collect();
        (Table::new(self.headers.clone(), rows), changed)
    }

    /// Append a header if the table does not have it yet.
    pub(crate) fn push_header(&mut self, name: &str) {
        if !self.has_column(name) {
            self.headers.push(name.to_string());
        }
    }
}
