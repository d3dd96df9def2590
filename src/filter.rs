// 🔍 Filter Engine - region/category selection over the record store
//
// A record is in view iff its region AND its category are selected.
// An empty selection is a real state: it matches nothing.

use crate::record::{Category, Region, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

// ============================================================================
// FILTER PREDICATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub selected_regions: HashSet<Region>,
    pub selected_categories: HashSet<Category>,
}

impl FilterPredicate {
    pub fn new(
        regions: impl IntoIterator<Item = Region>,
        categories: impl IntoIterator<Item = Category>,
    ) -> Self {
        Self {
            selected_regions: regions.into_iter().collect(),
            selected_categories: categories.into_iter().collect(),
        }
    }

    /// Every known region and category
    pub fn all() -> Self {
        Self::new(Region::ALL, Category::ALL)
    }

    /// Nothing selected
    pub fn none() -> Self {
        Self::new([], [])
    }

    /// Build from user-supplied names. Names outside the enumerations are
    /// dropped: no record can carry them, so they could never match anyway.
    pub fn from_names<R, C>(regions: &[R], categories: &[C]) -> Self
    where
        R: AsRef<str>,
        C: AsRef<str>,
    {
        let selected_regions = regions
            .iter()
            .filter_map(|name| {
                let region = Region::from_name(name.as_ref());
                if region.is_none() {
                    debug!(name = name.as_ref(), "ignoring unknown region in filter");
                }
                region
            })
            .collect();

        let selected_categories = categories
            .iter()
            .filter_map(|name| {
                let category = Category::from_name(name.as_ref());
                if category.is_none() {
                    debug!(name = name.as_ref(), "ignoring unknown category in filter");
                }
                category
            })
            .collect();

        Self {
            selected_regions,
            selected_categories,
        }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.selected_regions.contains(&record.region)
            && self.selected_categories.contains(&record.category)
    }

    pub fn toggle_region(&mut self, region: Region) {
        if !self.selected_regions.remove(&region) {
            self.selected_regions.insert(region);
        }
    }

    pub fn toggle_category(&mut self, category: Category) {
        if !self.selected_categories.remove(&category) {
            self.selected_categories.insert(category);
        }
    }

    pub fn select_all(&mut self) {
        *self = Self::all();
    }

    pub fn clear(&mut self) {
        self.selected_regions.clear();
        self.selected_categories.clear();
    }

    /// Selected regions in canonical order (for display)
    pub fn regions(&self) -> Vec<Region> {
        Region::ALL
            .into_iter()
            .filter(|r| self.selected_regions.contains(r))
            .collect()
    }

    /// Selected categories in canonical order (for display)
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.selected_categories.contains(c))
            .collect()
    }
}

impl Default for FilterPredicate {
    fn default() -> Self {
        Self::all()
    }
}

// ============================================================================
// FILTERING
// ============================================================================

/// Records matching `predicate`, in their original relative order
pub fn apply(records: &[TransactionRecord], predicate: &FilterPredicate) -> Vec<TransactionRecord> {
    let filtered: Vec<TransactionRecord> = records
        .iter()
        .filter(|record| predicate.matches(record))
        .cloned()
        .collect();

    debug!(
        input = records.len(),
        matched = filtered.len(),
        regions = predicate.selected_regions.len(),
        categories = predicate.selected_categories.len(),
        "applied filter"
    );

    filtered
}

/// Distinct values present in a dataset, in first-appearance order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<Region>,
    pub categories: Vec<Category>,
}

pub fn filter_options(records: &[TransactionRecord]) -> FilterOptions {
    let mut regions = Vec::new();
    let mut categories = Vec::new();

    for record in records {
        if !regions.contains(&record.region) {
            regions.push(record.region);
        }
        if !categories.contains(&record.category) {
            categories.push(record.category);
        }
    }

    FilterOptions { regions, categories }
}

// ============================================================================
// TESTS
// ============================================================================
