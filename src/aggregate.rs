// 📊 Aggregator - KPIs and grouped sales summaries for the filtered view
//
// Pure function of its input: no state, no caching. Grouping keeps the
// first-appearance order of each key (IndexMap) so tie-breaking is explicit
// instead of depending on a hash order.

use crate::record::{Region, TransactionRecord, YearMonth};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCategorySales {
    pub sub_category: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSales {
    pub region: Region,
    pub sales: f64,
    /// Share of total sales in percent, one decimal
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    pub month: YearMonth,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub total_sales: f64,
    pub total_profit: f64,
    pub profit_margin_pct: f64,
    /// Ascending by sales
    pub sales_by_sub_category: Vec<SubCategorySales>,
    /// Region appearance order in the filtered sequence
    pub sales_by_region: Vec<RegionSales>,
    /// Chronological
    pub sales_by_month: Vec<MonthlySales>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.sales_by_sub_category.is_empty()
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Round to one decimal place, ties to even (0.25 -> 0.2, 0.75 -> 0.8)
pub fn round_1dp(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

pub fn profit_margin_pct(total_sales: f64, total_profit: f64) -> f64 {
    if total_sales > 0.0 {
        round_1dp(100.0 * total_profit / total_sales)
    } else {
        0.0
    }
}

pub fn sales_by_sub_category(records: &[TransactionRecord]) -> Vec<SubCategorySales> {
    let mut groups: IndexMap<&str, f64> = IndexMap::new();
    for record in records {
        *groups.entry(record.sub_category.as_str()).or_insert(0.0) += record.sales;
    }

    let mut result: Vec<SubCategorySales> = groups
        .into_iter()
        .map(|(sub_category, sales)| SubCategorySales {
            sub_category: sub_category.to_string(),
            sales,
        })
        .collect();

    // Stable: equal totals keep first-appearance order
    result.sort_by(|a, b| a.sales.total_cmp(&b.sales));
    result
}

pub fn sales_by_region(records: &[TransactionRecord]) -> Vec<RegionSales> {
    let mut groups: IndexMap<Region, f64> = IndexMap::new();
    for record in records {
        *groups.entry(record.region).or_insert(0.0) += record.sales;
    }

    let total: f64 = groups.values().sum();

    groups
        .into_iter()
        .map(|(region, sales)| RegionSales {
            region,
            sales,
            share_pct: if total > 0.0 { round_1dp(100.0 * sales / total) } else { 0.0 },
        })
        .collect()
}

pub fn sales_by_month(records: &[TransactionRecord]) -> Vec<MonthlySales> {
    let mut groups: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for record in records {
        *groups.entry(record.month()).or_insert(0.0) += record.sales;
    }

    groups
        .into_iter()
        .map(|(month, sales)| MonthlySales { month, sales })
        .collect()
}

/// KPIs plus the three grouped views. An empty input yields zeros and
/// empty groups.
pub fn aggregate(records: &[TransactionRecord]) -> AggregationResult {
    let total_sales: f64 = records.iter().map(|r| r.sales).sum();
    let total_profit: f64 = records.iter().map(|r| r.profit).sum();

    let result = AggregationResult {
        total_sales,
        total_profit,
        profit_margin_pct: profit_margin_pct(total_sales, total_profit),
        sales_by_sub_category: sales_by_sub_category(records),
        sales_by_region: sales_by_region(records),
        sales_by_month: sales_by_month(records),
    };

    debug!(
        records = records.len(),
        total_sales,
        total_profit,
        margin = result.profit_margin_pct,
        "aggregated filtered view"
    );

    result
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;
    use chrono::NaiveDate;

    fn create_test_record(
        date: (i32, u32, u32),
        region: Region,
        category: Category,
        sub: &str,
        sales: f64,
        profit: f64,
    ) -> TransactionRecord {
        TransactionRecord {
            order_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            region,
            category,
            sub_category: sub.to_string(),
            sales,
            profit,
        }
    }

    fn three_records() -> Vec<TransactionRecord> {
        vec![
            create_test_record((2024, 1, 1), Region::East, Category::Furniture, "Chairs", 100.0, 10.0),
            create_test_record((2024, 1, 2), Region::West, Category::Technology, "Phones", 200.0, -20.0),
            create_test_record((2024, 1, 3), Region::East, Category::Furniture, "Chairs", 50.0, 5.0),
        ]
    }

    #[test]
    fn test_kpis() {
        let result = aggregate(&three_records());
        assert_eq!(result.total_sales, 350.0);
        assert_eq!(result.total_profit, -5.0);
        assert_eq!(result.profit_margin_pct, -1.4);
    }

    #[test]
    fn test_sub_category_ascending() {
        let result = aggregate(&three_records());
        assert_eq!(
            result.sales_by_sub_category,
            vec![
                SubCategorySales { sub_category: "Chairs".to_string(), sales: 150.0 },
                SubCategorySales { sub_category: "Phones".to_string(), sales: 200.0 },
            ]
        );
    }

    #[test]
    fn test_sub_category_ties_keep_first_appearance() {
        let records = vec![
            create_test_record((2024, 1, 1), Region::East, Category::Technology, "Phones", 300.0, 0.0),
            create_test_record((2024, 1, 2), Region::East, Category::Furniture, "Tables", 100.0, 0.0),
            create_test_record((2024, 1, 3), Region::East, Category::Furniture, "Chairs", 100.0, 0.0),
        ];
        let labels: Vec<String> = sales_by_sub_category(&records)
            .into_iter()
            .map(|g| g.sub_category)
            .collect();
        assert_eq!(labels, vec!["Tables", "Chairs", "Phones"]);
    }

    #[test]
    fn test_region_appearance_order_and_share() {
        let records = vec![
            create_test_record((2024, 1, 1), Region::South, Category::Furniture, "Chairs", 100.0, 0.0),
            create_test_record((2024, 1, 2), Region::East, Category::Furniture, "Chairs", 300.0, 0.0),
            create_test_record((2024, 1, 3), Region::South, Category::Furniture, "Chairs", 100.0, 0.0),
        ];
        let regions = sales_by_region(&records);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region, Region::South);
        assert_eq!(regions[0].sales, 200.0);
        assert_eq!(regions[0].share_pct, 40.0);
        assert_eq!(regions[1].region, Region::East);
        assert_eq!(regions[1].share_pct, 60.0);
    }

    #[test]
    fn test_months_are_chronological() {
        let records = vec![
            create_test_record((2024, 3, 5), Region::East, Category::Furniture, "Chairs", 10.0, 0.0),
            create_test_record((2023, 12, 31), Region::East, Category::Furniture, "Chairs", 20.0, 0.0),
            create_test_record((2024, 1, 15), Region::East, Category::Furniture, "Chairs", 30.0, 0.0),
            create_test_record((2024, 3, 1), Region::East, Category::Furniture, "Chairs", 40.0, 0.0),
        ];
        let months: Vec<(String, f64)> = sales_by_month(&records)
            .into_iter()
            .map(|m| (m.month.to_string(), m.sales))
            .collect();

        assert_eq!(
            months,
            vec![
                ("2023-12".to_string(), 20.0),
                ("2024-01".to_string(), 30.0),
                ("2024-03".to_string(), 50.0),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let result = aggregate(&[]);
        assert_eq!(result.total_sales, 0.0);
        assert_eq!(result.total_profit, 0.0);
        assert_eq!(result.profit_margin_pct, 0.0);
        assert!(result.sales_by_sub_category.is_empty());
        assert!(result.sales_by_region.is_empty());
        assert!(result.sales_by_month.is_empty());
        assert!(result.is_empty());
    }

    #[test]
    fn test_margin_zero_when_no_sales() {
        assert_eq!(profit_margin_pct(0.0, 123.0), 0.0);
        assert_eq!(profit_margin_pct(0.0, -5.0), 0.0);
        assert_eq!(profit_margin_pct(200.0, 50.0), 25.0);
    }

    #[test]
    fn test_margin_ties_round_to_even() {
        assert_eq!(profit_margin_pct(400.0, 1.0), 0.2);
        assert_eq!(profit_margin_pct(400.0, -1.0), -0.2);
        assert_eq!(profit_margin_pct(400.0, 3.0), 0.8);
    }

    #[test]
    fn test_region_share_ties_round_to_even() {
        // 1 / 400 of total sales is exactly 0.25%
        let records = vec![
            create_test_record((2024, 1, 1), Region::West, Category::Furniture, "Chairs", 1.0, 0.0),
            create_test_record((2024, 1, 2), Region::East, Category::Furniture, "Chairs", 399.0, 0.0),
        ];
        let regions = sales_by_region(&records);
        assert_eq!(regions[0].share_pct, 0.2);
        assert_eq!(regions[1].share_pct, 99.8);
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let records = three_records();
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
