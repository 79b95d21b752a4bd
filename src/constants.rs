/// Column name constants to ensure consistency across the codebase.
/// Compensation columns are matched by their normalized names, so these
/// are only meaningful after the schema normalization stage has run.
pub const ANNUAL_BASE_PAY_COLUMN: &str = "annual_base_pay";
pub const SIGNING_BONUS_COLUMN: &str = "signing_bonus";
pub const ANNUAL_BONUS_COLUMN: &str = "annual_bonus";

/// The designated compensation columns the row validator caps. Each is
/// optional in any given dataset; absent columns are skipped.
pub const COMPENSATION_COLUMNS: [&str; 3] = [
    ANNUAL_BASE_PAY_COLUMN,
    SIGNING_BONUS_COLUMN,
    ANNUAL_BONUS_COLUMN,
];

/// Placeholder written into textual cells by the imputation stage.
pub const TEXT_PLACEHOLDER: &str = "Unknown";

/// Fraction of nulls above which the pruner drops a column.
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.5;

/// Compensation values above this are considered unrealistic.
pub const DEFAULT_SALARY_CEILING: f64 = 10_000_000.0;

pub fn is_compensation_column(name: &str) -> bool {
    COMPENSATION_COLUMNS.contains(&name)
}
