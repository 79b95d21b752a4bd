//! Row validation: drops rows carrying non-printable text or unrealistic
//! compensation values, and reports how many were removed.

use crate::constants::is_compensation_column;
use crate::error::{InsightError, Result};
use crate::table::{ColumnValues, Table};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

/// Matches any character outside the printable-ASCII range, including
/// control characters such as NUL.
static INVALID_CHARACTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x20-\x7E]").expect("invalid character pattern"));

/// Removes every row for which at least one violation holds, evaluated as a
/// single combined predicate over all columns (logical OR of violations):
///
/// 1. a textual cell contains a character outside `[0x20, 0x7E]`, or
/// 2. a designated compensation cell exceeds `ceiling`.
///
/// Because each violation only ever clears a row's keep flag, the outcome is
/// independent of the order columns and checks are visited. Compensation
/// columns absent from the table are skipped; a compensation column holding
/// textual data is a schema mismatch, never silently coerced.
///
/// Returns the surviving table and the number of rows removed.
pub fn remove_invalid_rows(table: Table, ceiling: f64) -> Result<(Table, usize)> {
    for column in table.columns() {
        if is_compensation_column(&column.name) && column.is_textual() {
            return Err(InsightError::SchemaMismatch {
                column: column.name.clone(),
            });
        }
    }

    let initial_rows = table.row_count();
    let mut keep = vec![true; initial_rows];

    for column in table.columns() {
        match &column.values {
            ColumnValues::Textual(values) => {
                for (row, cell) in values.iter().enumerate() {
                    if let Some(text) = cell {
                        if INVALID_CHARACTERS.is_match(text) {
                            keep[row] = false;
                        }
                    }
                }
            }
            ColumnValues::Numeric(values) => {
                if is_compensation_column(&column.name) {
                    for (row, cell) in values.iter().enumerate() {
                        if let Some(value) = cell {
                            if *value > ceiling {
                                keep[row] = false;
                            }
                        }
                    }
                }
            }
        }
    }

    let validated = table.retain_rows(&keep);
    let removed = initial_rows - validated.row_count();
    if removed > 0 {
        counter!("salary_validator_rows_removed_total").increment(removed as u64);
    }
    info!(rows_removed = removed, ceiling, "row validation complete");

    Ok((validated, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn text(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn drops_rows_with_control_characters() {
        let table = Table::new(vec![Column::textual(
            "notes",
            text(&["valid", "invalid\x00", "also valid"]),
        )]);

        let (validated, removed) = remove_invalid_rows(table, 1e7).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            validated.column("notes").unwrap().values,
            ColumnValues::Textual(text(&["valid", "also valid"]))
        );
    }

    #[test]
    fn drops_rows_with_non_ascii_text() {
        let table = Table::new(vec![Column::textual("city", text(&["Seattle", "Zürich"]))]);

        let (validated, removed) = remove_invalid_rows(table, 1e7).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(validated.row_count(), 1);
    }

    #[test]
    fn enforces_ceiling_on_compensation_columns_only() {
        let table = Table::new(vec![
            Column::numeric("annual_base_pay", vec![Some(1_000_000_000.0), Some(9_999_999.0)]),
            Column::numeric("employee_count", vec![Some(1e12), Some(5.0)]),
        ]);

        let (validated, removed) = remove_invalid_rows(table, 10_000_000.0).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            validated.column("annual_base_pay").unwrap().values,
            ColumnValues::Numeric(vec![Some(9_999_999.0)])
        );
        // Non-compensation columns are never range-checked.
        assert_eq!(
            validated.column("employee_count").unwrap().values,
            ColumnValues::Numeric(vec![Some(5.0)])
        );
    }

    #[test]
    fn a_row_failing_any_check_is_dropped_entirely() {
        let table = Table::new(vec![
            Column::textual("notes", text(&["bad\x00", "fine", "fine"])),
            Column::numeric("signing_bonus", vec![Some(100.0), Some(1e9), Some(200.0)]),
        ]);

        let (validated, removed) = remove_invalid_rows(table, 1e7).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(validated.row_count(), 1);
    }

    #[test]
    fn outcome_is_independent_of_column_order() {
        let forward = Table::new(vec![
            Column::textual("notes", text(&["bad\x00", "fine"])),
            Column::numeric("annual_bonus", vec![Some(1e9), Some(1.0)]),
        ]);
        let reversed = Table::new(vec![
            Column::numeric("annual_bonus", vec![Some(1e9), Some(1.0)]),
            Column::textual("notes", text(&["bad\x00", "fine"])),
        ]);

        let (a, removed_a) = remove_invalid_rows(forward, 1e7).unwrap();
        let (b, removed_b) = remove_invalid_rows(reversed, 1e7).unwrap();
        assert_eq!(removed_a, removed_b);
        assert_eq!(a.row_count(), b.row_count());
        assert_eq!(a.column("notes").unwrap().values, b.column("notes").unwrap().values);
    }

    #[test]
    fn textual_compensation_column_is_a_schema_mismatch() {
        let table = Table::new(vec![Column::textual("annual_base_pay", text(&["lots"]))]);

        let result = remove_invalid_rows(table, 1e7);
        assert!(matches!(
            result,
            Err(InsightError::SchemaMismatch { column }) if column == "annual_base_pay"
        ));
    }

    #[test]
    fn valid_rows_survive_unchanged() {
        let table = Table::new(vec![
            Column::textual("role", text(&["dev", "pm"])),
            Column::numeric("annual_base_pay", vec![Some(150_000.0), Some(120_000.0)]),
        ]);

        let (validated, removed) = remove_invalid_rows(table.clone(), 1e7).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(validated, table);
    }
}
