// 🧾 Transaction Records - immutable values describing one retail sale
// Region and Category are closed enumerations; sub-category stays a string
// because each category owns its own list.

use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

// ============================================================================
// REGION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    East,
    West,
    Central,
    South,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::East, Region::West, Region::Central, Region::South];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::East => "East",
            Region::West => "West",
            Region::Central => "Central",
            Region::South => "South",
        }
    }

    /// Case-insensitive lookup; `None` for names outside the enumeration
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Furniture,
    #[serde(rename = "Office Supplies")]
    OfficeSupplies,
    Technology,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Furniture,
        Category::OfficeSupplies,
        Category::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Furniture => "Furniture",
            Category::OfficeSupplies => "Office Supplies",
            Category::Technology => "Technology",
        }
    }

    /// Sub-categories a record of this category may carry
    pub fn sub_categories(&self) -> &'static [&'static str] {
        match self {
            Category::Furniture => &["Chairs", "Tables", "Bookcases"],
            Category::OfficeSupplies => &["Paper", "Binders", "Art", "Fasteners"],
            Category::Technology => &["Phones", "Accessories", "Copiers"],
        }
    }

    /// Case-insensitive lookup. Accepts "Office Supplies", "office-supplies"
    /// and "OfficeSupplies".
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();

        Self::ALL.iter().copied().find(|c| {
            let canonical: String = c.as_str().chars().filter(|ch| !ch.is_whitespace()).collect();
            canonical.eq_ignore_ascii_case(&normalized)
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// YEAR-MONTH KEY
// ============================================================================

/// Calendar month used for the revenue trend. Field order makes the derived
/// `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// One synthetic retail transaction. Created once by the record store and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "Order Date")]
    pub order_date: NaiveDate,

    #[serde(rename = "Region")]
    pub region: Region,

    #[serde(rename = "Category")]
    pub category: Category,

    #[serde(rename = "Sub-Category")]
    pub sub_category: String,

    /// Non-negative sale amount
    #[serde(rename = "Sales")]
    pub sales: f64,

    /// Signed; a loss is negative
    #[serde(rename = "Profit")]
    pub profit: f64,
}

impl TransactionRecord {
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.order_date)
    }
}

/// Write records as CSV (header + one row per record) in the given order
pub fn export_csv<W: Write>(records: &[TransactionRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
