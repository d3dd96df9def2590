// ⚙️ Dataset configuration
// Precedence: CLI flag > environment variable > default (handled by clap)

use crate::error::{AnalyticsError, Result};
use crate::store::{default_start_date, DEFAULT_ROW_COUNT};
use chrono::NaiveDate;
use clap::Args;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub row_count: usize,
    pub start_date: NaiveDate,
    /// None = fresh random dataset every run
    pub seed: Option<u64>,
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.row_count == 0 {
            return Err(AnalyticsError::InvalidRowCount(self.row_count));
        }
        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            row_count: DEFAULT_ROW_COUNT,
            start_date: default_start_date(),
            seed: None,
        }
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| AnalyticsError::InvalidDate {
        value: value.to_string(),
    })
}

/// Dataset flags shared by every binary
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Number of synthetic transactions (one per day)
    #[arg(long, env = "SUPERSTORE_ROWS", default_value_t = DEFAULT_ROW_COUNT)]
    pub rows: usize,

    /// First order date (YYYY-MM-DD)
    #[arg(long, env = "SUPERSTORE_START_DATE", default_value = "2024-01-01")]
    pub start_date: String,

    /// Seed for a reproducible dataset
    #[arg(long, env = "SUPERSTORE_SEED")]
    pub seed: Option<u64>,
}

impl DatasetArgs {
    pub fn into_config(self) -> Result<DashboardConfig> {
        let config = DashboardConfig {
            row_count: self.rows,
            start_date: parse_date(&self.start_date)?,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}
