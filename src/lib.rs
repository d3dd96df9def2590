// SuperStore Analytics - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod error;
pub mod record;     // Transaction records + dimension enums
pub mod store;      // Synthetic dataset generation + per-session cache
pub mod filter;     // Region/category predicate
pub mod aggregate;  // KPIs + grouped sales views
pub mod dashboard;  // Session boundary handed to front-ends
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{AnalyticsError, Result};
pub use record::{export_csv, Category, Region, TransactionRecord, YearMonth};
pub use store::{generate, generate_with, RecordStore, DEFAULT_ROW_COUNT};
pub use filter::{filter_options, FilterOptions, FilterPredicate};
pub use aggregate::{
    aggregate, AggregationResult, MonthlySales, RegionSales, SubCategorySales,
};
pub use dashboard::{
    build_view, format_thousands, kpi_cards, DashboardSession, DashboardSnapshot,
    DashboardView, KpiCard,
};
pub use config::{DashboardConfig, DatasetArgs};
pub use logging::init_logging;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
