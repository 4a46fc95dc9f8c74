//! Single-trace and map exports.

use chrono::NaiveDate;
use clap::ValueEnum;
use log::warn;
use owid_chart::map::choropleth_json;
use owid_chart::ChartError;
use owid_core::field::is_cumulative;
use owid_core::{Dataset, TransformError};
use owid_data::models::FactorPoint;
use owid_data::transform::{
    aggregate_locations, compute_lethality, filter_by_location, forward_fill_cumulative,
    lethality_against_factor, slice_by_date, snapshot_all_locations, LocationSeries,
};
use owid_data::{views, DisplayState};
use serde::Serialize;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    /// total_cases
    Cumulative,
    /// new_cases
    NewCases,
    /// new_cases_smoothed
    Smoothed,
    /// new_cases_smoothed against stringency_index
    Stringency,
    /// total_deaths / total_cases, optionally joined with a factor
    Lethality,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

#[derive(Debug, Clone)]
pub struct SeriesRequest {
    pub location: String,
    pub trace: Trace,
    pub until: Option<NaiveDate>,
    pub factor: Option<String>,
}

fn selected_series(dataset: &Dataset, location: &str, until: Option<NaiveDate>) -> LocationSeries {
    let filled = forward_fill_cumulative(dataset, &dataset.cumulative_fields());
    let series = filter_by_location(&filled, location);
    if series.is_empty() {
        warn!("No rows for location {}", location);
    }
    match until {
        Some(cutoff) => slice_by_date(&series, cutoff),
        None => series,
    }
}

pub fn render_series(dataset: &Dataset, request: &SeriesRequest, format: Format) -> anyhow::Result<String> {
    let series = selected_series(dataset, &request.location, request.until);
    match (request.trace, &request.factor) {
        (Trace::Cumulative, _) => encode(&views::cumulative_cases(&series), format),
        (Trace::NewCases, _) => encode(&views::daily_new_cases(&series), format),
        (Trace::Smoothed, _) => encode(&views::daily_new_cases_smoothed(&series), format),
        (Trace::Stringency, _) => encode(&views::stringency_overlay(&series), format),
        (Trace::Lethality, None) => encode(&compute_lethality(&series), format),
        (Trace::Lethality, Some(factor)) => match lethality_against_factor(&series, factor) {
            Ok(points) => encode(&points, format),
            Err(e) => {
                warn!("{}", e);
                encode::<FactorPoint>(&[], format)
            }
        },
    }
}

fn encode<T: Serialize>(rows: &[T], format: Format) -> anyhow::Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(rows)? + "\n"),
        Format::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            for row in rows {
                wtr.serialize(row)?;
            }
            let bytes = wtr
                .into_inner()
                .map_err(|e| anyhow::anyhow!("failed to flush CSV: {}", e.error()))?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}

fn no_data_json(reason: String) -> anyhow::Result<String> {
    warn!("{}", reason);
    Ok(serde_json::to_string_pretty(&DisplayState::<()>::NoData { reason })? + "\n")
}

/// Choropleth JSON for one running-total field across all locations.
pub fn render_snapshot(
    dataset: &Dataset,
    field: &str,
    exclude: &[String],
    keep_aggregates: bool,
) -> anyhow::Result<String> {
    if !dataset.has_field(field) {
        let e = TransformError::UnknownField {
            field: field.to_string(),
        };
        return no_data_json(e.to_string());
    }
    if !is_cumulative(field) {
        return no_data_json(format!("{} is not a running total", field));
    }
    let filled = forward_fill_cumulative(dataset, &dataset.cumulative_fields());
    let mut excluded = if keep_aggregates {
        Vec::new()
    } else {
        aggregate_locations(&filled)
    };
    excluded.extend(exclude.iter().cloned());
    let snapshots = snapshot_all_locations(&filled, &excluded);
    let values = views::map_values(&snapshots, field);
    match choropleth_json(field, &values) {
        Ok(json) => Ok(json + "\n"),
        Err(ChartError::NoData(reason)) => no_data_json(reason),
        Err(e) => Err(e.into()),
    }
}
