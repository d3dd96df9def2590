// 🛒 Dashboard Session - the boundary handed to front-ends (TUI, HTTP)
//
// A session owns its dataset and its current filter. Every view() runs the
// full filter -> aggregate pipeline; NoData tells the front-end to stop
// rendering charts.

use crate::aggregate::{aggregate, AggregationResult};
use crate::config::DashboardConfig;
use crate::filter::{self, filter_options, FilterOptions, FilterPredicate};
use crate::record::TransactionRecord;
use crate::store::RecordStore;
use serde::Serialize;
use tracing::info;

// ============================================================================
// KPI CARDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: String,
}

/// `1234567.9` -> `1,234,567` (integer part, thousands separators)
pub fn format_thousands(value: f64) -> String {
    let whole = value.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if whole < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn kpi_cards(summary: &AggregationResult) -> Vec<KpiCard> {
    vec![
        KpiCard {
            label: "Total Sales",
            value: format!("${}", format_thousands(summary.total_sales)),
        },
        KpiCard {
            label: "Total Profit",
            value: format!("${}", format_thousands(summary.total_profit)),
        },
        KpiCard {
            label: "Profit Margin",
            value: format!("{:.1}%", summary.profit_margin_pct),
        },
    ]
}

// ============================================================================
// VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub summary: AggregationResult,
    pub kpis: Vec<KpiCard>,
    /// Filtered records, newest order date first
    pub records: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// Filter matched nothing; front-ends show a warning and stop
    NoData,
    Ready(DashboardSnapshot),
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        matches!(self, DashboardView::NoData)
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        match self {
            DashboardView::NoData => None,
            DashboardView::Ready(snapshot) => Some(snapshot),
        }
    }
}

/// Run the pipeline over `records` for one predicate
pub fn build_view(records: &[TransactionRecord], predicate: &FilterPredicate) -> DashboardView {
    let mut filtered = filter::apply(records, predicate);
    if filtered.is_empty() {
        info!("no data for current filter");
        return DashboardView::NoData;
    }

    let summary = aggregate(&filtered);
    let kpis = kpi_cards(&summary);

    // Stable sort: equal dates keep dataset order
    filtered.sort_by(|a, b| b.order_date.cmp(&a.order_date));

    DashboardView::Ready(DashboardSnapshot {
        summary,
        kpis,
        records: filtered,
    })
}

// ============================================================================
// SESSION
// ============================================================================

pub struct DashboardSession {
    store: RecordStore,
    predicate: FilterPredicate,
}

impl DashboardSession {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            predicate: FilterPredicate::default(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        let mut store = RecordStore::new(config.row_count, config.start_date);
        if let Some(seed) = config.seed {
            store = store.with_seed(seed);
        }
        Self::new(store)
    }

    pub fn records(&self) -> &[TransactionRecord] {
        self.store.records()
    }

    pub fn options(&self) -> FilterOptions {
        filter_options(self.store.records())
    }

    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }

    pub fn predicate_mut(&mut self) -> &mut FilterPredicate {
        &mut self.predicate
    }

    pub fn set_predicate(&mut self, predicate: FilterPredicate) {
        self.predicate = predicate;
    }

    /// Filtered records in dataset order
    pub fn filtered(&self) -> Vec<TransactionRecord> {
        filter::apply(self.store.records(), &self.predicate)
    }

    pub fn view(&self) -> DashboardView {
        build_view(self.store.records(), &self.predicate)
    }
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new(RecordStore::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Category, Region};
    use chrono::NaiveDate;

    fn create_test_record(day: u32, region: Region, sub: &str, sales: f64, profit: f64) -> TransactionRecord {
        TransactionRecord {
            order_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            region,
            category: Category::Furniture,
            sub_category: sub.to_string(),
            sales,
            profit,
        }
    }

    fn session() -> DashboardSession {
        DashboardSession::new(RecordStore::from_records(vec![
            create_test_record(1, Region::East, "Chairs", 100.0, 10.0),
            create_test_record(2, Region::West, "Tables", 2500.0, 300.0),
            create_test_record(3, Region::East, "Chairs", 50.0, 5.0),
        ]))
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.9), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(506464.7), "506,464");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(-12345.6), "-12,345");
    }

    #[test]
    fn test_view_ready_with_kpis_and_sorted_records() {
        let view = session().view();
        let snapshot = view.snapshot().expect("view should have data");

        assert_eq!(snapshot.summary.total_sales, 2650.0);
        assert_eq!(snapshot.kpis[0].value, "$2,650");
        assert_eq!(snapshot.kpis[1].value, "$315");
        assert_eq!(snapshot.kpis[2].value, "11.9%");

        let days: Vec<u32> = snapshot
            .records
            .iter()
            .map(|r| chrono::Datelike::day(&r.order_date))
            .collect();
        assert_eq!(days, vec![3, 2, 1]);
    }

    #[test]
    fn test_view_no_data_when_nothing_selected() {
        let mut session = session();
        session.predicate_mut().clear();
        assert_eq!(session.view(), DashboardView::NoData);
        assert!(session.view().is_empty());
    }

    #[test]
    fn test_view_follows_predicate_changes() {
        let mut session = session();
        session.set_predicate(FilterPredicate::new([Region::East], Category::ALL));

        let view = session.view();
        assert_eq!(view.snapshot().unwrap().summary.total_sales, 150.0);
        assert_eq!(session.filtered().len(), 2);

        session.predicate_mut().toggle_region(Region::East);
        assert!(session.view().is_empty());
    }

    #[test]
    fn test_session_options() {
        let options = session().options();
        assert_eq!(options.regions, vec![Region::East, Region::West]);
        assert_eq!(options.categories, vec![Category::Furniture]);
    }

    #[test]
    fn test_sessions_own_independent_data() {
        let config = DashboardConfig {
            row_count: 30,
            ..DashboardConfig::default()
        };
        let a = DashboardSession::from_config(&config);
        let b = DashboardSession::from_config(&config);

        assert_eq!(a.records().len(), 30);
        assert_eq!(b.records().len(), 30);
        assert!(!std::ptr::eq(a.records().as_ptr(), b.records().as_ptr()));
    }
}
