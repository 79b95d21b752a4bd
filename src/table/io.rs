//! CSV ingest and egress for the in-memory [`Table`].
//!
//! The first row is the header; an empty field is a null. Column types are
//! inferred on load: a column whose non-null cells all parse as finite
//! decimal literals (and that has at least one non-null cell) is numeric,
//! anything else is textual.

use crate::error::{InsightError, Result};
use crate::table::{Column, ColumnValues, Table};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;
use tracing::{debug, info};

pub fn read_csv(path: &Path) -> Result<Table> {
    let reader = ReaderBuilder::new().from_path(path).map_err(|e| {
        InsightError::SourceRead(format!("failed to open '{}': {}", path.display(), e))
    })?;
    let table = parse_table(reader)?;

    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        source = %path.display(),
        "loaded raw table"
    );
    Ok(table)
}

/// Parses an in-memory CSV byte stream (header row included) into a table.
/// Used by gateways that accept the cleaned table as a byte stream.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<Table> {
    parse_table(ReaderBuilder::new().from_reader(bytes))
}

fn parse_table<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Table> {
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| InsightError::SourceRead(format!("invalid header row: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| InsightError::SourceRead(format!("malformed row {}: {}", row + 1, e)))?;
        if record.len() != headers.len() {
            return Err(InsightError::SourceRead(format!(
                "row {} has {} fields, expected {}",
                row + 1,
                record.len(),
                headers.len()
            )));
        }
        for (column, field) in record.iter().enumerate() {
            cells[column].push(if field.is_empty() {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();
    Ok(Table::new(columns))
}

fn infer_column(name: String, raw: Vec<Option<String>>) -> Column {
    let mut saw_value = false;
    let all_numeric = raw.iter().flatten().all(|field| {
        saw_value = true;
        parse_numeric(field).is_some()
    });

    if saw_value && all_numeric {
        let values = raw
            .into_iter()
            .map(|cell| cell.and_then(|field| parse_numeric(&field)))
            .collect();
        debug!(column = %name, "inferred numeric column");
        Column::numeric(name, values)
    } else {
        Column::textual(name, raw)
    }
}

fn parse_numeric(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path).map_err(|e| {
        InsightError::DestinationWrite(format!("failed to open '{}': {}", path.display(), e))
    })?;

    let sink_error =
        |e: csv::Error| InsightError::DestinationWrite(format!("write to '{}' failed: {}", path.display(), e));

    writer
        .write_record(table.column_names())
        .map_err(sink_error)?;

    for row in 0..table.row_count() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| match &column.values {
                ColumnValues::Textual(v) => v[row].clone().unwrap_or_default(),
                ColumnValues::Numeric(v) => v[row].map(format_numeric).unwrap_or_default(),
            })
            .collect();
        writer.write_record(&record).map_err(sink_error)?;
    }

    writer.flush().map_err(|e| {
        InsightError::DestinationWrite(format!("flush to '{}' failed: {}", path.display(), e))
    })?;

    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        sink = %path.display(),
        "wrote cleaned table"
    );
    Ok(())
}

/// Whole numbers render without a fractional part so that imputed zeros and
/// integer salaries round-trip as plain integers.
fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_nulls_and_infers_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(
            &path,
            "name,annual_base_pay,notes\nAda,50000,\n,60000.5,fine\nGrace,,ok\n",
        )
        .unwrap();

        let table = read_csv(&path).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);

        let name = table.column("name").unwrap();
        assert!(name.is_textual());
        assert_eq!(name.null_count(), 1);

        let pay = table.column("annual_base_pay").unwrap();
        assert!(pay.is_numeric());
        match &pay.values {
            ColumnValues::Numeric(v) => {
                assert_eq!(v, &vec![Some(50000.0), Some(60000.5), None])
            }
            other => panic!("expected numeric column, got {:?}", other),
        }
    }

    #[test]
    fn numeric_looking_text_stays_textual_when_mixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "zip\n98101\nN/A\n").unwrap();

        let table = read_csv(&path).unwrap();
        assert!(table.column("zip").unwrap().is_textual());
    }

    #[test]
    fn all_null_column_is_textual() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "a,b\n1,\n2,\n").unwrap();

        let table = read_csv(&path).unwrap();
        assert!(table.column("b").unwrap().is_textual());
        assert_eq!(table.column("b").unwrap().null_count(), 2);
    }

    #[test]
    fn missing_source_is_a_read_error() {
        let result = read_csv(Path::new("definitely/not/here.csv"));
        assert!(matches!(result, Err(InsightError::SourceRead(_))));
    }

    #[test]
    fn ragged_row_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "a,b\n1,2\n3\n").unwrap();

        assert!(matches!(read_csv(&path), Err(InsightError::SourceRead(_))));
    }

    #[test]
    fn round_trips_whole_numbers_without_fraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = Table::new(vec![
            Column::textual("role", vec![Some("dev".to_string())]),
            Column::numeric("pay", vec![Some(50000.0)]),
        ]);

        write_csv(&table, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "role,pay\ndev,50000\n");
    }
}
