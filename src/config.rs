use crate::constants::{DEFAULT_MISSING_THRESHOLD, DEFAULT_SALARY_CEILING};
use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Knobs for the cleaning pipeline. Loaded from a TOML file when one is
/// supplied, otherwise defaulted; individual values can be overridden by
/// CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Fraction of nulls above which a column is dropped (inclusive boundary
    /// is retained).
    #[serde(default = "default_missing_threshold")]
    pub missing_threshold: f64,
    /// Cap enforced on the designated compensation columns.
    #[serde(default = "default_salary_ceiling")]
    pub salary_ceiling: f64,
}

fn default_missing_threshold() -> f64 {
    DEFAULT_MISSING_THRESHOLD
}

fn default_salary_ceiling() -> f64 {
    DEFAULT_SALARY_CEILING
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
            salary_ceiling: DEFAULT_SALARY_CEILING,
        }
    }
}

impl CleaningConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            InsightError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: CleaningConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            return Err(InsightError::Config(format!(
                "missing_threshold must be in [0, 1], got {}",
                self.missing_threshold
            )));
        }
        if !self.salary_ceiling.is_finite() || self.salary_ceiling <= 0.0 {
            return Err(InsightError::Config(format!(
                "salary_ceiling must be a positive number, got {}",
                self.salary_ceiling
            )));
        }
        Ok(())
    }
}
