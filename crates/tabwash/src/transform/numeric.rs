//! Numeric rescaling of one column.
//!
//! Only cells with a numeric value are rewritten; everything else, missing
//! cells included, passes through untouched.

use super::TransformOutcome;
use crate::stats::sample;
use crate::table::{Cell, Table, numeric_value};

/// Rewrite every numeric cell for which `f` returns a value.
fn map_numeric<F>(table: &Table, column: &str, mut f: F) -> TransformOutcome
where
    F: FnMut(f64) -> Option<f64>,
{
    let (table, cells_changed) =
        table.map_column(column, |cell| numeric_value(cell).and_then(&mut f).map(Cell::from_number));
    TransformOutcome::rewritten(table, cells_changed)
}

/// Z-score normalization with the population standard deviation.
///
/// A zero or undefined spread divides by 1.
pub fn normalize(table: &Table, column: &str) -> TransformOutcome {
    let values = table.numeric_column(column);
    let Some(mean) = sample::mean(&values) else {
        return TransformOutcome::unchanged(table);
    };
    let std_dev = match sample::std_dev(&values) {
        Some(s) if s != 0.0 => s,
        _ => 1.0,
    };
    map_numeric(table, column, |v| Some((v - mean) / std_dev))
}

/// Min-max scaling into `[min, max]`. A constant column is left unchanged.
pub fn scale(table: &Table, column: &str, min: f64, max: f64) -> TransformOutcome {
    let values = table.numeric_column(column);
    let (Some(lo), Some(hi)) = (sample::min(&values), sample::max(&values)) else {
        return TransformOutcome::unchanged(table);
    };
    let span = hi - lo;
    if span == 0.0 {
        return TransformOutcome::unchanged(table);
    }
    map_numeric(table, column, |v| Some(min + (v - lo) / span * (max - min)))
}

/// Natural log of the strictly positive values.
pub fn log(table: &Table, column: &str) -> TransformOutcome {
    map_numeric(table, column, |v| (v > 0.0).then(|| v.ln()))
}

/// Square root of the non-negative values.
pub fn square_root(table: &Table, column: &str) -> TransformOutcome {
    map_numeric(table, column, |v| (v >= 0.0).then(|| v.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn column(values: &[&str]) -> Table {
        Table::from_rows(["v"], values.iter().map(|v| vec![*v]))
    }

    fn texts(table: &Table) -> Vec<String> {
        table.column_cells("v").iter().map(Cell::to_text).collect()
    }

    #[test]
    fn test_normalize() {
        let outcome = normalize(&column(&["2", "4", "4", "4", "5", "5", "7", "9", "x"]), "v");
        // mean 5, population sd 2
        assert_eq!(
            texts(&outcome.table),
            vec!["-1.5", "-0.5", "-0.5", "-0.5", "0", "0", "1", "2", "x"]
        );
        assert_eq!(outcome.cells_changed, 8);
    }

    #[test]
    fn test_normalize_constant_divides_by_one() {
        let outcome = normalize(&column(&["3", "3"]), "v");
        assert_eq!(texts(&outcome.table), vec!["0", "0"]);
    }

    #[test]
    fn test_scale() {
        let outcome = scale(&column(&["10", "15", "20", ""]), "v", 0.0, 1.0);
        assert_eq!(texts(&outcome.table), vec!["0", "0.5", "1", ""]);

        let ranged = scale(&column(&["10", "20"]), "v", -1.0, 1.0);
        assert_eq!(texts(&ranged.table), vec!["-1", "1"]);
    }

    #[test]
    fn test_scale_constant_column_is_noop() {
        let table = column(&["4", "4"]);
        let outcome = scale(&table, "v", 0.0, 1.0);
        assert_eq!(outcome.table, table);
        assert_eq!(outcome.cells_changed, 0);
    }

    #[test]
    fn test_log_and_sqrt_domains() {
        let logged = log(&column(&["1", "0", "-2", "abc"]), "v");
        assert_eq!(texts(&logged.table), vec!["0", "0", "-2", "abc"]);
        assert_eq!(logged.cells_changed, 1);

        let rooted = square_root(&column(&["9", "0", "-4"]), "v");
        assert_eq!(texts(&rooted.table), vec!["3", "0", "-4"]);
        assert_eq!(rooted.cells_changed, 2);
    }
}
