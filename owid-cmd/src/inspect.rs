//! Plain-text listings for the selection surface.

use chrono::NaiveDate;
use owid_core::Dataset;
use owid_data::models::LocationSummary;
use owid_data::transform::{filter_by_location, forward_fill_cumulative, slice_by_date, summarize_latest};

pub fn print_locations(dataset: &Dataset) {
    for location in dataset.locations() {
        println!("{}", location);
    }
}

pub fn print_factors(dataset: &Dataset) {
    for factor in dataset.available_factors() {
        println!("{}", factor);
    }
}

/// Sidebar text for a location, or the "no data" notice.
pub fn summary_text(dataset: &Dataset, location: &str, until: Option<NaiveDate>) -> String {
    let filled = forward_fill_cumulative(dataset, &dataset.cumulative_fields());
    let mut series = filter_by_location(&filled, location);
    if let Some(cutoff) = until {
        series = slice_by_date(&series, cutoff);
    }
    match summarize_latest(&series) {
        Ok(summary) => format_summary(&summary),
        Err(e) => {
            log::warn!("{}", e);
            format!("No data for this location: {}\n", location)
        }
    }
}

fn format_summary(summary: &LocationSummary) -> String {
    let count = |v: Option<u64>| v.map_or_else(|| "n/a".to_string(), |v| v.to_string());
    let stringency = summary
        .stringency_index
        .map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v));
    format!(
        "{} (as of {})\n  population:              {}\n  total cases:             {}\n  people fully vaccinated: {}\n  stringency index:        {}\n",
        summary.location,
        summary.date,
        count(summary.population),
        count(summary.total_cases),
        count(summary.people_fully_vaccinated),
        stringency
    )
}

pub fn print_summary(dataset: &Dataset, location: &str, until: Option<NaiveDate>) -> anyhow::Result<()> {
    print!("{}", summary_text(dataset, location, until));
    Ok(())
}
