//! Column pruning: drops columns whose null fraction exceeds the configured
//! threshold. Columns at exactly the threshold are retained.

use crate::table::Table;
use metrics::counter;
use tracing::info;

/// Removes every column whose null fraction is strictly greater than
/// `threshold`, preserving the relative order of the survivors. Returns the
/// pruned table together with the names of the dropped columns.
///
/// A zero-row table has no meaningful null fraction, so nothing is dropped.
pub fn drop_sparse_columns(table: Table, threshold: f64) -> (Table, Vec<String>) {
    let rows = table.row_count();
    if rows == 0 {
        return (table, Vec::new());
    }

    let mut dropped = Vec::new();
    let columns = table
        .into_columns()
        .into_iter()
        .filter(|column| {
            let null_fraction = column.null_count() as f64 / rows as f64;
            if null_fraction > threshold {
                dropped.push(column.name.clone());
                false
            } else {
                true
            }
        })
        .collect();

    if !dropped.is_empty() {
        counter!("salary_pruner_columns_dropped_total").increment(dropped.len() as u64);
        info!(columns = ?dropped, threshold, "dropped sparse columns");
    }

    (Table::new(columns), dropped)
}
