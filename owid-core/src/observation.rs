use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::field::AGGREGATE_ISO_CODES;

/// One row of the dataset: a location on a date.
///
/// Numeric columns are stored positionally; the owning [`crate::Dataset`]
/// maps column names to positions. `None` means the source had no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub location: String,
    pub date: NaiveDate,
    pub iso_code: Option<String>,
    pub continent: Option<String>,
    pub values: Vec<Option<f64>>,
}

impl Observation {
    /// Value at a column position, `None` when absent or out of range.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// True for OWID's own aggregate rows (World, continents, income groups).
    pub fn is_aggregate(&self) -> bool {
        self.iso_code
            .as_deref()
            .is_some_and(|code| AGGREGATE_ISO_CODES.contains(&code))
    }

    /// Order by date only, for sorting within a single location.
    pub fn cmp_date(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}
