pub mod io;

use serde::{Deserialize, Serialize};

/// Cell values for a single column. A column is entirely textual or entirely
/// numeric; the two are never mixed per cell. `None` is the distinguished
/// null marker, not a sentinel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValues {
    Textual(Vec<Option<String>>),
    Numeric(Vec<Option<f64>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Textual(v) => v.len(),
            ColumnValues::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnValues::Textual(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValues::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }
}

/// A named, typed sequence of cells aligned by row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn textual<S: Into<String>>(name: S, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Textual(values),
        }
    }

    pub fn numeric<S: Into<String>>(name: S, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.null_count()
    }

    pub fn is_textual(&self) -> bool {
        matches!(self.values, ColumnValues::Textual(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }
}

/// An in-memory table: ordered named columns sharing one row count.
///
/// Ownership transfers linearly through the cleaning stages; each stage
/// consumes its input table and produces a successor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Columns must have unique names and equal lengths; the CSV loader and
    /// every stage uphold this.
    pub fn new(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns.windows(2).all(|w| w[0].len() == w[1].len()),
            "column lengths must agree"
        );
        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Total null cells across all columns.
    pub fn null_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Keeps only the rows whose mask entry is true, preserving order.
    /// The mask length must equal the row count.
    pub fn retain_rows(self, keep: &[bool]) -> Table {
        debug_assert_eq!(keep.len(), self.row_count());
        let columns = self
            .columns
            .into_iter()
            .map(|col| {
                let values = match col.values {
                    ColumnValues::Textual(v) => ColumnValues::Textual(filter_by_mask(v, keep)),
                    ColumnValues::Numeric(v) => ColumnValues::Numeric(filter_by_mask(v, keep)),
                };
                Column {
                    name: col.name,
                    values,
                }
            })
            .collect();
        Table { columns }
    }
}

fn filter_by_mask<T>(values: Vec<T>, keep: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(keep.iter())
        .filter_map(|(value, &kept)| kept.then_some(value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::textual(
                "name",
                vec![Some("Ada".to_string()), None, Some("Grace".to_string())],
            ),
            Column::numeric("pay", vec![Some(100.0), Some(200.0), None]),
        ])
    }

    #[test]
    fn counts_rows_columns_and_nulls() {
        let table = sample_table();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.null_count(), 2);
    }

    #[test]
    fn empty_table_has_zero_rows() {
        let table = Table::default();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.null_count(), 0);
    }

    #[test]
    fn retain_rows_filters_every_column_in_lockstep() {
        let table = sample_table();
        let filtered = table.retain_rows(&[true, false, true]);
        assert_eq!(filtered.row_count(), 2);

        let names = filtered.column("name").unwrap();
        assert_eq!(
            names.values,
            ColumnValues::Textual(vec![Some("Ada".to_string()), Some("Grace".to_string())])
        );
        let pay = filtered.column("pay").unwrap();
        assert_eq!(pay.values, ColumnValues::Numeric(vec![Some(100.0), None]));
    }
}
