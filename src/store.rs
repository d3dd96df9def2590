// 🏪 Record Store - synthetic retail dataset, generated once and cached
//
// The store is owned by a session. Generation happens lazily on first access
// and every later access returns the same records.

use crate::record::{Category, Region, TransactionRecord};
use chrono::{Duration, NaiveDate};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

pub const DEFAULT_ROW_COUNT: usize = 500;

/// Sales are drawn from [SALES_MIN, SALES_MAX)
pub const SALES_MIN: u32 = 50;
pub const SALES_MAX: u32 = 2000;

/// Profit ratio applied to sales, drawn from [MARGIN_MIN, MARGIN_MAX)
pub const MARGIN_MIN: f64 = -0.1;
pub const MARGIN_MAX: f64 = 0.4;

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Generate `row_count` records, one per consecutive day from `start_date`
pub fn generate_with<R: Rng>(
    rng: &mut R,
    row_count: usize,
    start_date: NaiveDate,
) -> Vec<TransactionRecord> {
    let mut records = Vec::with_capacity(row_count);

    for day in 0..row_count {
        let category = Category::ALL[rng.gen_range(0..Category::ALL.len())];
        let subs = category.sub_categories();
        let sub_category = subs[rng.gen_range(0..subs.len())];
        let sales = rng.gen_range(SALES_MIN..SALES_MAX) as f64;
        let profit = sales * rng.gen_range(MARGIN_MIN..MARGIN_MAX);
        let region = Region::ALL[rng.gen_range(0..Region::ALL.len())];

        records.push(TransactionRecord {
            order_date: start_date + Duration::days(day as i64),
            region,
            category,
            sub_category: sub_category.to_string(),
            sales,
            profit,
        });
    }

    records
}

/// Unseeded generation
pub fn generate(row_count: usize, start_date: NaiveDate) -> Vec<TransactionRecord> {
    let mut rng = StdRng::from_entropy();
    generate_with(&mut rng, row_count, start_date)
}

// ============================================================================
// RECORD STORE
// ============================================================================

pub struct RecordStore {
    row_count: usize,
    start_date: NaiveDate,
    seed: Option<u64>,
    records: OnceCell<Vec<TransactionRecord>>,
}

impl RecordStore {
    pub fn new(row_count: usize, start_date: NaiveDate) -> Self {
        Self {
            row_count,
            start_date,
            seed: None,
            records: OnceCell::new(),
        }
    }

    /// Reproducible dataset for tests and demos
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Wrap records that already exist (fixtures, imported data)
    pub fn from_records(records: Vec<TransactionRecord>) -> Self {
        let start_date = records
            .first()
            .map(|r| r.order_date)
            .unwrap_or_else(default_start_date);

        Self {
            row_count: records.len(),
            start_date,
            seed: None,
            records: OnceCell::with_value(records),
        }
    }

    /// Cached records; generated on first call
    pub fn records(&self) -> &[TransactionRecord] {
        self.records.get_or_init(|| {
            let records = match self.seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    generate_with(&mut rng, self.row_count, self.start_date)
                }
                None => generate(self.row_count, self.start_date),
            };

            info!(
                rows = records.len(),
                start = %self.start_date,
                seeded = self.seed.is_some(),
                "generated synthetic dataset"
            );
            records
        })
    }

    pub fn is_generated(&self) -> bool {
        self.records.get().is_some()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_COUNT, default_start_date())
    }
}

// ============================================================================
// TESTS
// ============================================================================
