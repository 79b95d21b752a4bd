//! The cleaning pipeline orchestrator. Threads one in-memory table through
//! the four stages in fixed order and reports the row/column deltas.

pub mod stages;

use crate::config::CleaningConfig;
use crate::error::Result;
use crate::table::{self, Table};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};
use uuid::Uuid;

/// Result of a complete cleaning run. Serialized to JSON next to the
/// cleaned CSV so that row/column deltas are auditable after the fact.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    pub run_id: Uuid,
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_in: usize,
    pub columns_out: usize,
    pub pruned_columns: Vec<String>,
    pub rows_removed_by_validation: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct CleaningPipeline {
    config: CleaningConfig,
}

impl CleaningPipeline {
    pub fn new(config: CleaningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Runs the four stages over an in-memory table. Stage order is fixed:
    /// names are normalized first so that pruning and validation match the
    /// designated compensation columns by their canonical names.
    #[instrument(skip(self, table), fields(rows_in = table.row_count()))]
    pub fn run(&self, table: Table) -> Result<(Table, CleaningReport)> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        let rows_in = table.row_count();
        let columns_in = table.column_count();

        let normalized = stages::normalize::clean_column_names(table);
        let (pruned, pruned_columns) =
            stages::prune::drop_sparse_columns(normalized, self.config.missing_threshold);
        let filled = stages::impute::fill_missing(pruned);
        let (validated, rows_removed) =
            stages::validate::remove_invalid_rows(filled, self.config.salary_ceiling)?;

        let report = CleaningReport {
            run_id,
            rows_in,
            rows_out: validated.row_count(),
            columns_in,
            columns_out: validated.column_count(),
            pruned_columns,
            rows_removed_by_validation: rows_removed,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            run_id = %report.run_id,
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            columns_dropped = report.columns_in - report.columns_out,
            rows_removed = report.rows_removed_by_validation,
            "cleaning run complete"
        );

        Ok((validated, report))
    }

    /// Loads a raw CSV from `source`, runs the stages, writes the cleaned
    /// CSV to `sink`, and drops a JSON run report next to it. Source errors
    /// propagate before anything is written; the sink is only touched after
    /// all in-memory stages succeeded.
    pub fn run_file(&self, source: &Path, sink: &Path) -> Result<CleaningReport> {
        let raw = table::io::read_csv(source)?;
        let (cleaned, report) = self.run(raw)?;
        table::io::write_csv(&cleaned, sink)?;

        let report_path = sink.with_extension("report.json");
        if let Ok(json) = serde_json::to_string_pretty(&report) {
            // The report artifact is telemetry; failing to write it does not
            // fail a run whose cleaned output already landed.
            if let Err(e) = fs::write(&report_path, json) {
                tracing::warn!(path = %report_path.display(), "failed to write run report: {}", e);
            }
        }

        Ok(report)
    }
}
