//! View model structs handed to the presentation layer.
//!
//! All structs derive `Serialize` so they can be written out as JSON for a
//! chart renderer. Dates serialize as `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// A single (date, value) pair used for line and bar chart data points.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DateValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// One x position of a dual-axis chart.
///
/// Either side may be missing on a given date; renderers skip the gap.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DualAxisPoint {
    pub date: NaiveDate,
    pub primary: Option<f64>,
    pub secondary: Option<f64>,
}

/// Lethality on a date alongside the selected factor's value.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FactorPoint {
    pub date: NaiveDate,
    /// total_deaths / total_cases
    pub lethality: f64,
    pub factor: Option<f64>,
}

/// Per-location maximum of every cumulative field.
///
/// Given forward-filled input the maximum is also the latest value.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationSnapshot {
    pub location: String,
    pub iso_code: Option<String>,
    pub continent: Option<String>,
    /// Fields with no value anywhere in the group are left out.
    pub values: BTreeMap<String, f64>,
}

impl LocationSnapshot {
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

/// One region of the choropleth layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapValue {
    /// ISO 3166-1 alpha-3 code, used to join against map geometry.
    pub iso_code: String,
    pub location: String,
    pub value: f64,
}

/// Sidebar figures for the selected location.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationSummary {
    pub location: String,
    /// Date of the row the latest figures come from.
    pub date: NaiveDate,
    pub population: Option<u64>,
    pub total_cases: Option<u64>,
    pub people_fully_vaccinated: Option<u64>,
    /// Expected in [0, 100]; not enforced.
    pub stringency_index: Option<f64>,
}
