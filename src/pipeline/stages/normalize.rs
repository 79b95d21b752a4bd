//! Schema normalization: canonicalizes column names so that later stages
//! (and the warehouse schema) match on stable identifiers.

use crate::table::{Column, Table};

/// Lowercases every column name, trims surrounding whitespace, collapses
/// internal whitespace runs into single underscores, and drops characters
/// outside `[a-z0-9_]`. Cell data is untouched. Idempotent.
pub fn clean_column_names(table: Table) -> Table {
    let columns = table
        .into_columns()
        .into_iter()
        .map(|column| Column {
            name: normalize_name(&column.name),
            values: column.values,
        })
        .collect();
    Table::new(columns)
}

fn normalize_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}
