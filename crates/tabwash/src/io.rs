//! CSV and polars interop.
//!
//! The engine works on raw strings, so CSV files are read with schema
//! inference disabled: every column arrives as text and numeric coercion
//! happens per cell. Empty fields are read as nulls.

use crate::error::{Result, ResultExt};
use crate::table::{Cell, Row, Table};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load a CSV file with a header row into a [`Table`].
pub fn read_csv(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Parsing {}", path.display()))?;

    debug!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );

    table_from_dataframe(&df)
}

/// Write a table to CSV with a header row. Null and absent cells are empty.
pub fn write_csv(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut df = table_to_dataframe(table)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .context(format!("Writing {}", path.display()))?;

    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Convert a DataFrame into a table, stringifying every column.
///
/// Polars nulls become [`Cell::Null`].
pub fn table_from_dataframe(df: &DataFrame) -> Result<Table> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut rows: Vec<Row> = vec![Row::with_capacity(headers.len()); df.height()];

    for (name, column) in headers.iter().zip(df.get_columns()) {
        let as_text = column
            .as_materialized_series()
            .cast(&DataType::String)
            .context(format!("Casting column '{}' to text", name))?;
        let values = as_text.str().context(format!("Reading column '{}'", name))?;

        for (row, value) in rows.iter_mut().zip(values.into_iter()) {
            let cell = value.map_or(Cell::Null, Cell::from);
            row.insert(name.clone(), cell);
        }
    }

    Ok(Table::new(headers, rows))
}

/// Convert a table into a DataFrame of nullable string columns.
pub fn table_to_dataframe(table: &Table) -> Result<DataFrame> {
    let columns: Vec<Column> = table
        .headers
        .iter()
        .map(|name| {
            let values: Vec<Option<String>> = table
                .rows
                .iter()
                .map(|row| match row.get(name) {
                    None | Some(Cell::Null) => None,
                    Some(cell) => Some(cell.to_text()),
                })
                .collect();
            Column::new(name.as_str().into(), values)
        })
        .collect();

    DataFrame::new(columns).context("Building DataFrame from table")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dataframe_round_trip_keeps_raw_strings() {
        let table = Table::from_rows(
            ["name", "score"],
            [vec!["a", "1.50"], vec!["b", "n/a"], vec!["c", "0x10"]],
        );
        let df = table_to_dataframe(&table).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(table_from_dataframe(&df).unwrap(), table);
    }

    #[test]
    fn test_nulls_and_absent_keys() {
        let mut table = Table::from_rows(["a", "b"], [vec!["x"], vec!["y", "z"]]);
        table.rows[1].insert("a".to_string(), Cell::Null);

        let df = table_to_dataframe(&table).unwrap();
        let back = table_from_dataframe(&df).unwrap();
        assert_eq!(back.cell(0, "b"), Some(&Cell::Null));
        assert_eq!(back.cell(1, "a"), Some(&Cell::Null));
        assert_eq!(back.cell(1, "b"), Some(&Cell::from("z")));
    }

    #[test]
    fn test_numeric_dataframe_is_stringified() {
        let df = DataFrame::new(vec![Column::new("n".into(), vec![1i64, 2, 3])]).unwrap();
        let table = table_from_dataframe(&df).unwrap();
        assert_eq!(table.numeric_column("n"), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_csv_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("tabwash-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("round_trip.csv");

        let table = Table::from_rows(["id", "v"], [vec!["1", "007"], vec!["2", "abc"]]);
        write_csv(&table, &path).unwrap();
        let loaded = read_csv(&path).unwrap();

        // schema inference is off, so leading zeros survive
        assert_eq!(loaded, table);
        std::fs::remove_dir_all(&dir).ok();
    }
}
