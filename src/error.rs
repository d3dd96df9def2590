// Error taxonomy for the analytics core
// An empty filter result is NOT an error - see dashboard::DashboardView::NoData

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("row count must be positive (got {0})")]
    InvalidRowCount(usize),

    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
