//! Fill values derived from a column's numeric projection.

use crate::config::MissingValueOperation;
use crate::stats;
use crate::table::{Cell, Table};
use crate::types::ScalarValue;
use crate::utils::format_number;

/// Statistical fill-value computation.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// The string a fill operation writes into missing cells.
    ///
    /// Mean, median and mode are computed over the numeric cells of the
    /// column. When the statistic is undefined the fill value is empty.
    pub fn fill_value(table: &Table, column: &str, operation: &MissingValueOperation) -> String {
        let numeric: Vec<Cell> = table
            .column_cells(column)
            .into_iter()
            .filter(|cell| cell.as_number().is_some())
            .collect();

        match operation {
            MissingValueOperation::FillMean => Self::format(stats::mean(&numeric)),
            MissingValueOperation::FillMedian => Self::format(stats::median(&numeric)),
            MissingValueOperation::FillMode => match stats::mode(&numeric).into_iter().next() {
                Some(ScalarValue::Number(n)) => format_number(n),
                Some(ScalarValue::Text(s)) => s,
                None => String::new(),
            },
            MissingValueOperation::FillCustom(value) => value.clone(),
            MissingValueOperation::RemoveRows => String::new(),
        }
    }

    fn format(value: Option<f64>) -> String {
        value.map(format_number).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_value_ignores_non_numeric() {
        let table = Table::from_rows(["v"], [vec!["x"], vec!["x"], vec!["x"], vec!["2"], vec!["4"]]);
        assert_eq!(StatisticalImputer::fill_value(&table, "v", &MissingValueOperation::FillMean), "3");
        // "x" is the most frequent string but not numeric
        assert_eq!(StatisticalImputer::fill_value(&table, "v", &MissingValueOperation::FillMode), "2");
    }

    #[test]
    fn test_fill_value_unknown_column() {
        let table = Table::from_rows(["v"], [vec!["1"]]);
        assert_eq!(
            StatisticalImputer::fill_value(&table, "nope", &MissingValueOperation::FillMedian),
            ""
        );
    }
}
