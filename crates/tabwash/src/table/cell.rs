//! Cell values and the validity rules applied to them.

use crate::utils::{format_number, is_invalid_token, parse_number};
use serde::{Deserialize, Serialize};

/// One value at a (row, column) position.
///
/// A key that is absent from a [`Row`](super::Row) is read as `None` by the
/// table accessors; `Null` is an explicit null supplied by the producer.
/// Both count as missing, as does text matching an invalid token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    /// Explicit null.
    #[default]
    Null,
    /// A number supplied already parsed.
    Number(f64),
    /// A raw string, as produced by the CSV reader.
    Text(String),
}

impl Cell {
    /// Check if the cell counts as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Number(n) => n.is_nan(),
            Cell::Text(s) => is_invalid_token(s),
        }
    }

    /// Numeric coercion of a present cell.
    pub fn as_number(&self) -> Option<f64> {
        if self.is_missing() {
            return None;
        }
        match self {
            Cell::Number(n) => Some(*n).filter(|v| v.is_finite()),
            Cell::Text(s) => parse_number(s),
            Cell::Null => None,
        }
    }

    /// The string form of the cell. Null becomes the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Build a text cell holding a formatted number.
    pub fn from_number(value: f64) -> Self {
        Cell::Text(format_number(value))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// Check if a possibly absent cell is missing.
pub fn is_missing(cell: Option<&Cell>) -> bool {
    cell.is_none_or(Cell::is_missing)
}

/// Numeric value of a possibly absent cell.
pub fn numeric_value(cell: Option<&Cell>) -> Option<f64> {
    cell.and_then(Cell::as_number)
}
