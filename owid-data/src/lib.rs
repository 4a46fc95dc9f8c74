//! Data shaping for the COVID-19 dashboard.
//!
//! This crate turns the raw long-format [`owid_core::Dataset`] into the
//! views each chart needs. Every function is pure: the user's selection
//! comes in as plain values and owned results go out.

pub mod dashboard;
pub mod models;
pub mod transform;
pub mod views;

pub use dashboard::{render_pass, DashboardView, DisplayState, Selection};
pub use transform::LocationSeries;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use owid_core::{Dataset, Observation};

    pub fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    pub fn row(location: &str, d: u32, values: Vec<Option<f64>>) -> Observation {
        Observation {
            location: location.to_string(),
            date: day(d),
            iso_code: None,
            continent: None,
            values,
        }
    }

    /// Columns: total_cases, new_cases, total_deaths, stringency_index, population
    pub fn dataset(rows: Vec<Observation>) -> Dataset {
        Dataset::new(
            vec![
                "total_cases".to_string(),
                "new_cases".to_string(),
                "total_deaths".to_string(),
                "stringency_index".to_string(),
                "population".to_string(),
            ],
            rows,
        )
    }
}
