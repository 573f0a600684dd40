//! Sort orders for the accumulated product collection

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::product::ProductRecord;

/// Ordering applied to the product collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Load order
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    RatingAsc,
    RatingDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::PriceDesc,
        SortKey::PriceAsc,
        SortKey::RatingDesc,
        SortKey::RatingAsc,
        SortKey::Default,
    ];

    /// Identifier used on the command line and in JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Default => "default",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::RatingAsc => "rating-asc",
            SortKey::RatingDesc => "rating-desc",
        }
    }

    /// Menu label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Default => "Reset",
            SortKey::PriceAsc => "Price (Low to High)",
            SortKey::PriceDesc => "Price (High to Low)",
            SortKey::RatingAsc => "Rating (Low to High)",
            SortKey::RatingDesc => "Rating (High to Low)",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = SortKey::ALL.iter().map(SortKey::as_str).collect();
                format!("Invalid sort key: {s}. Valid keys: {}", valid.join(", "))
            })
    }
}

/// Sort `records` in place by `key`
///
/// Records without a price go after priced ones in both price orders. Equal
/// keys fall back to ascending `sequence_id`, which makes repeated sorting
/// with the same key a no-op.
pub fn sort_records(records: &mut [ProductRecord], key: SortKey) {
    records.sort_by(|a, b| compare(a, b, key));
}

fn compare(a: &ProductRecord, b: &ProductRecord, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Default => Ordering::Equal,
        SortKey::PriceAsc => compare_prices(a.price_value, b.price_value, false),
        SortKey::PriceDesc => compare_prices(a.price_value, b.price_value, true),
        SortKey::RatingAsc => a.rating.total_cmp(&b.rating),
        SortKey::RatingDesc => b.rating.total_cmp(&a.rating),
    };

    primary.then_with(|| a.sequence_id.cmp(&b.sequence_id))
}

fn compare_prices(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
