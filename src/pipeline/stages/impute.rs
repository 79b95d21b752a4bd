//! Missing-value imputation: fills nulls per column type. Dispatch is driven
//! entirely by the column's type tag, never by inspecting individual cells.

use crate::constants::TEXT_PLACEHOLDER;
use crate::table::{Column, ColumnValues, Table};

/// Replaces every null with the column type's default: `"Unknown"` for
/// textual columns, `0` for numeric ones. Row and column counts are
/// unchanged; after this stage the table holds no nulls.
pub fn fill_missing(table: Table) -> Table {
    let columns = table
        .into_columns()
        .into_iter()
        .map(|column| {
            let values = match column.values {
                ColumnValues::Textual(v) => ColumnValues::Textual(
                    v.into_iter()
                        .map(|cell| Some(cell.unwrap_or_else(|| TEXT_PLACEHOLDER.to_string())))
                        .collect(),
                ),
                ColumnValues::Numeric(v) => ColumnValues::Numeric(
                    v.into_iter().map(|cell| Some(cell.unwrap_or(0.0))).collect(),
                ),
            };
            Column {
                name: column.name,
                values,
            }
        })
        .collect();
    Table::new(columns)
}
