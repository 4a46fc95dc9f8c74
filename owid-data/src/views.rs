//! Chart-ready traces built from a [`LocationSeries`] or a snapshot table.

use owid_core::field::{NEW_CASES, NEW_CASES_SMOOTHED, STRINGENCY_INDEX, TOTAL_CASES};
use owid_core::TransformError;

use crate::models::{DateValue, DualAxisPoint, LocationSnapshot, MapValue};
use crate::transform::LocationSeries;

/// (date, value) for the rows where `field` has a value.
pub fn field_series(series: &LocationSeries, field: &str) -> Result<Vec<DateValue>, TransformError> {
    Ok(series
        .values(field)?
        .into_iter()
        .filter_map(|(date, value)| value.map(|value| DateValue { date, value }))
        .collect())
}

/// Like [`field_series`], treating an absent column as an empty trace.
fn optional_series(series: &LocationSeries, field: &str) -> Vec<DateValue> {
    field_series(series, field).unwrap_or_default()
}

/// Line chart: total cases over time.
pub fn cumulative_cases(series: &LocationSeries) -> Vec<DateValue> {
    optional_series(series, TOTAL_CASES)
}

/// Bar chart: reported new cases per day.
pub fn daily_new_cases(series: &LocationSeries) -> Vec<DateValue> {
    optional_series(series, NEW_CASES)
}

/// Seven-day smoothed new cases, drawn over the daily bars.
pub fn daily_new_cases_smoothed(series: &LocationSeries) -> Vec<DateValue> {
    optional_series(series, NEW_CASES_SMOOTHED)
}

/// Dual-axis overlay: smoothed new cases (left) against stringency (right).
pub fn stringency_overlay(series: &LocationSeries) -> Vec<DualAxisPoint> {
    let primary = series.field_index(NEW_CASES_SMOOTHED);
    let secondary = series.field_index(STRINGENCY_INDEX);
    series
        .rows()
        .iter()
        .map(|obs| DualAxisPoint {
            date: obs.date,
            primary: primary.and_then(|i| obs.value(i)),
            secondary: secondary.and_then(|i| obs.value(i)),
        })
        .filter(|point| point.primary.is_some() || point.secondary.is_some())
        .collect()
}

/// Choropleth values for one field. Snapshots without an iso code or without
/// the field cannot be placed on the map and are dropped.
pub fn map_values(snapshots: &[LocationSnapshot], field: &str) -> Vec<MapValue> {
    snapshots
        .iter()
        .filter_map(|snapshot| {
            let iso_code = snapshot.iso_code.clone()?;
            let value = snapshot.get(field)?;
            Some(MapValue {
                iso_code,
                location: snapshot.location.clone(),
                value,
            })
        })
        .collect()
}
