//! The series transformer: filtering, forward-filling, slicing and
//! aggregation over a [`Dataset`].

use chrono::NaiveDate;
use log::debug;
use owid_core::date_range::DateBounds;
use owid_core::field::{
    MACRO_REGIONS, PEOPLE_FULLY_VACCINATED, POPULATION, STRINGENCY_INDEX, TOTAL_CASES,
    TOTAL_DEATHS,
};
use owid_core::{Dataset, Observation, TransformError};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{DateValue, FactorPoint, LocationSnapshot, LocationSummary};

/// The rows of one location, sorted by date ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSeries {
    location: String,
    data: Dataset,
}

impl LocationSeries {
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn rows(&self) -> &[Observation] {
        self.data.rows()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.data.field_index(name)
    }

    pub fn date_bounds(&self) -> Option<DateBounds> {
        let first = self.rows().first()?.date;
        let last = self.rows().last()?.date;
        Some(DateBounds { first, last })
    }

    /// (date, value) for every row, `None` where the row has no value.
    pub fn values(&self, field: &str) -> Result<Vec<(NaiveDate, Option<f64>)>, TransformError> {
        let index = self
            .field_index(field)
            .ok_or_else(|| TransformError::UnknownField {
                field: field.to_string(),
            })?;
        Ok(self
            .rows()
            .iter()
            .map(|obs| (obs.date, obs.value(index)))
            .collect())
    }

    fn with_rows(&self, rows: Vec<Observation>) -> Self {
        LocationSeries {
            location: self.location.clone(),
            data: self.data.with_rows(rows),
        }
    }
}

/// Row indices per location, locations in order of first appearance.
fn group_by_location(rows: &[Observation]) -> Vec<Vec<usize>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, obs) in rows.iter().enumerate() {
        let group = *index.entry(obs.location.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(i);
    }
    groups
}

/// Select the rows of one location.
///
/// An unknown location yields an empty series, not an error.
pub fn filter_by_location(dataset: &Dataset, location: &str) -> LocationSeries {
    let mut rows: Vec<Observation> = dataset
        .rows()
        .iter()
        .filter(|obs| obs.location == location)
        .cloned()
        .collect();
    // stable: equal dates keep source order
    rows.sort_by(Observation::cmp_date);
    debug!("filter_by_location: {} rows for {}", rows.len(), location);
    LocationSeries {
        location: location.to_string(),
        data: dataset.with_rows(rows),
    }
}

/// Carry running totals forward within each location.
///
/// For every named field, a missing value takes the last value seen earlier
/// in the same location, and so does a zero that follows a positive value.
/// Before the first value the field is 0. Locations never share state, and
/// row order of the result matches the input. Names not in the schema are
/// ignored.
pub fn forward_fill_cumulative<S: AsRef<str>>(dataset: &Dataset, field_names: &[S]) -> Dataset {
    let indices: Vec<usize> = field_names
        .iter()
        .filter_map(|name| {
            let index = dataset.field_index(name.as_ref());
            if index.is_none() {
                debug!("forward_fill_cumulative: no column {}", name.as_ref());
            }
            index
        })
        .collect();

    let mut rows = dataset.rows().to_vec();
    for mut group in group_by_location(&rows) {
        group.sort_by_key(|&i| rows[i].date);
        let mut last: Vec<Option<f64>> = vec![None; indices.len()];
        for row in group {
            for (slot, &field) in indices.iter().enumerate() {
                let Some(cell) = rows[row].values.get_mut(field) else {
                    continue;
                };
                let filled = match (*cell, last[slot]) {
                    (Some(v), Some(prev)) if v == 0.0 && prev > 0.0 => prev,
                    (Some(v), _) => v,
                    (None, Some(prev)) => prev,
                    (None, None) => 0.0,
                };
                *cell = Some(filled);
                last[slot] = Some(filled);
            }
        }
    }
    dataset.with_rows(rows)
}

/// Rows dated on or before `max_date`.
///
/// A cutoff after the last date is clamped to it; a cutoff before the
/// first date leaves nothing.
pub fn slice_by_date(series: &LocationSeries, max_date: NaiveDate) -> LocationSeries {
    let Some(bounds) = series.date_bounds() else {
        return series.clone();
    };
    if !bounds.contains(max_date) {
        debug!(
            "slice_by_date: cutoff {} outside {}..={} for {}",
            max_date, bounds.first, bounds.last, series.location
        );
    }
    if max_date < bounds.first {
        return series.with_rows(Vec::new());
    }
    let cutoff = bounds.clamp(max_date);
    let rows = series
        .rows()
        .iter()
        .take_while(|obs| obs.date <= cutoff)
        .cloned()
        .collect();
    series.with_rows(rows)
}

fn lethality(obs: &Observation, cases: usize, deaths: Option<usize>) -> Option<f64> {
    let total_cases = obs.value(cases).unwrap_or(0.0);
    if total_cases == 0.0 {
        return None;
    }
    let total_deaths = deaths.and_then(|i| obs.value(i)).unwrap_or(0.0);
    Some(total_deaths / total_cases)
}

/// total_deaths / total_cases per row, skipping rows without cases.
pub fn compute_lethality(series: &LocationSeries) -> Vec<DateValue> {
    let Some(cases) = series.field_index(TOTAL_CASES) else {
        return Vec::new();
    };
    let deaths = series.field_index(TOTAL_DEATHS);
    series
        .rows()
        .iter()
        .filter_map(|obs| {
            lethality(obs, cases, deaths).map(|value| DateValue {
                date: obs.date,
                value,
            })
        })
        .collect()
}

/// Lethality joined with another field, for the correlation view.
pub fn lethality_against_factor(
    series: &LocationSeries,
    factor: &str,
) -> Result<Vec<FactorPoint>, TransformError> {
    let factor_index = series
        .field_index(factor)
        .ok_or_else(|| TransformError::UnknownField {
            field: factor.to_string(),
        })?;
    let Some(cases) = series.field_index(TOTAL_CASES) else {
        return Ok(Vec::new());
    };
    let deaths = series.field_index(TOTAL_DEATHS);
    Ok(series
        .rows()
        .iter()
        .filter_map(|obs| {
            lethality(obs, cases, deaths).map(|lethality| FactorPoint {
                date: obs.date,
                lethality,
                factor: obs.value(factor_index),
            })
        })
        .collect())
}

/// One snapshot per location holding the maximum of each cumulative field.
///
/// Locations listed in `excluded_locations` are dropped; the rest keep their
/// first-appearance order.
pub fn snapshot_all_locations<S: AsRef<str>>(
    dataset: &Dataset,
    excluded_locations: &[S],
) -> Vec<LocationSnapshot> {
    let excluded: HashSet<&str> = excluded_locations.iter().map(|s| s.as_ref()).collect();
    let cumulative: Vec<(usize, String)> = dataset
        .cumulative_fields()
        .into_iter()
        .filter_map(|name| dataset.field_index(&name).map(|i| (i, name)))
        .collect();
    let rows = dataset.rows();

    group_by_location(rows)
        .into_iter()
        .filter(|group| !excluded.contains(rows[group[0]].location.as_str()))
        .map(|group| {
            let first = &rows[group[0]];
            let mut values = BTreeMap::new();
            for (index, name) in &cumulative {
                let max = group
                    .iter()
                    .filter_map(|&row| rows[row].value(*index))
                    .reduce(f64::max);
                if let Some(max) = max {
                    values.insert(name.clone(), max);
                }
            }
            LocationSnapshot {
                location: first.location.clone(),
                iso_code: group.iter().find_map(|&row| rows[row].iso_code.clone()),
                continent: group.iter().find_map(|&row| rows[row].continent.clone()),
                values,
            }
        })
        .collect()
}

/// Locations to leave off a country-level map: the known macro regions plus
/// anything carrying one of OWID's aggregate iso codes.
pub fn aggregate_locations(dataset: &Dataset) -> Vec<String> {
    let mut locations: Vec<String> = MACRO_REGIONS.iter().map(|s| s.to_string()).collect();
    let mut seen: HashSet<String> = locations.iter().cloned().collect();
    for obs in dataset.rows() {
        if obs.is_aggregate() && seen.insert(obs.location.clone()) {
            locations.push(obs.location.clone());
        }
    }
    locations
}

fn as_count(value: f64) -> Option<u64> {
    (value >= 0.0).then(|| value.round() as u64)
}

/// Headline figures for the selected location.
///
/// Population is the first value present (it is constant per location); the
/// rest come from the last row.
pub fn summarize_latest(series: &LocationSeries) -> Result<LocationSummary, TransformError> {
    let last = series
        .rows()
        .last()
        .ok_or_else(|| TransformError::EmptySeries {
            location: series.location.clone(),
        })?;
    let latest = |name: &str| series.field_index(name).and_then(|i| last.value(i));
    let population = series
        .field_index(POPULATION)
        .and_then(|i| series.rows().iter().find_map(|obs| obs.value(i)));

    Ok(LocationSummary {
        location: series.location.clone(),
        date: last.date,
        population: population.and_then(as_count),
        total_cases: latest(TOTAL_CASES).and_then(as_count),
        people_fully_vaccinated: latest(PEOPLE_FULLY_VACCINATED).and_then(as_count),
        stringency_index: latest(STRINGENCY_INDEX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{dataset, day, row};

    const TOTAL_CASES_IDX: usize = 0;
    const STRINGENCY_IDX: usize = 3;

    fn cumulative() -> Vec<&'static str> {
        vec!["total_cases", "total_deaths", "stringency_index"]
    }

    fn gappy() -> Dataset {
        dataset(vec![
            row("Poland", 1, vec![None, None, None, Some(10.0), Some(38.0e6)]),
            row("Poland", 2, vec![Some(5.0), Some(5.0), None, None, Some(38.0e6)]),
            row("Poland", 3, vec![None, Some(2.0), Some(1.0), Some(20.0), None]),
            row("Poland", 4, vec![Some(9.0), Some(4.0), None, None, None]),
            row("Poland", 5, vec![None, None, Some(2.0), Some(30.0), None]),
        ])
    }

    #[test]
    fn test_forward_fill_uses_last_value_or_zero() {
        let filled = forward_fill_cumulative(&gappy(), &cumulative());
        let cases: Vec<Option<f64>> = filled
            .rows()
            .iter()
            .map(|o| o.value(TOTAL_CASES_IDX))
            .collect();
        assert_eq!(
            cases,
            vec![Some(0.0), Some(5.0), Some(5.0), Some(9.0), Some(9.0)]
        );
        let stringency: Vec<Option<f64>> = filled
            .rows()
            .iter()
            .map(|o| o.value(STRINGENCY_IDX))
            .collect();
        assert_eq!(
            stringency,
            vec![Some(10.0), Some(10.0), Some(20.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn test_forward_fill_leaves_other_fields() {
        let filled = forward_fill_cumulative(&gappy(), &cumulative());
        // new_cases is not a running total
        assert_eq!(filled.rows()[0].value(1), None);
        assert_eq!(filled.rows()[4].value(1), None);
    }

    #[test]
    fn test_forward_fill_is_idempotent() {
        let once = forward_fill_cumulative(&gappy(), &cumulative());
        let twice = forward_fill_cumulative(&once, &cumulative());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_forward_fill_zero_after_positive() {
        let data = dataset(vec![
            row("Poland", 1, vec![Some(0.0), None, None, None, None]),
            row("Poland", 2, vec![Some(7.0), None, None, None, None]),
            row("Poland", 3, vec![Some(0.0), None, None, None, None]),
        ]);
        let filled = forward_fill_cumulative(&data, &cumulative());
        let cases: Vec<Option<f64>> = filled
            .rows()
            .iter()
            .map(|o| o.value(TOTAL_CASES_IDX))
            .collect();
        assert_eq!(cases, vec![Some(0.0), Some(7.0), Some(7.0)]);
    }

    #[test]
    fn test_forward_fill_groups_are_isolated() {
        let data = dataset(vec![
            row("Germany", 1, vec![Some(100.0), None, None, Some(50.0), None]),
            row("Poland", 1, vec![None, None, None, None, None]),
            row("Germany", 2, vec![None, None, None, None, None]),
            row("Poland", 2, vec![None, None, None, None, None]),
        ]);
        let filled = forward_fill_cumulative(&data, &cumulative());
        let rows = filled.rows();
        assert_eq!(rows[1].location, "Poland");
        assert_eq!(rows[1].value(TOTAL_CASES_IDX), Some(0.0));
        assert_eq!(rows[3].value(TOTAL_CASES_IDX), Some(0.0));
        assert_eq!(rows[3].value(STRINGENCY_IDX), Some(0.0));
        assert_eq!(rows[2].value(TOTAL_CASES_IDX), Some(100.0));
        assert_eq!(rows[2].value(STRINGENCY_IDX), Some(50.0));
    }

    #[test]
    fn test_forward_fill_scans_in_date_order() {
        let data = dataset(vec![
            row("Poland", 3, vec![None, None, None, None, None]),
            row("Poland", 1, vec![Some(4.0), None, None, None, None]),
        ]);
        let filled = forward_fill_cumulative(&data, &cumulative());
        // source order is preserved, the fill follows the calendar
        assert_eq!(filled.rows()[0].date, day(3));
        assert_eq!(filled.rows()[0].value(TOTAL_CASES_IDX), Some(4.0));
    }

    #[test]
    fn test_forward_fill_ignores_unknown_field() {
        let filled = forward_fill_cumulative(&gappy(), &["total_tests"]);
        assert_eq!(filled, gappy());
    }

    #[test]
    fn test_filter_by_location() {
        let data = dataset(vec![
            row("Poland", 2, vec![Some(2.0), None, None, None, None]),
            row("Germany", 1, vec![Some(9.0), None, None, None, None]),
            row("Poland", 1, vec![Some(1.0), None, None, None, None]),
        ]);
        let series = filter_by_location(&data, "Poland");
        assert_eq!(series.location(), "Poland");
        assert_eq!(series.len(), 2);
        assert_eq!(series.rows()[0].date, day(1));
        assert_eq!(series.rows()[1].date, day(2));
    }

    #[test]
    fn test_filter_unknown_location_is_empty() {
        let series = filter_by_location(&gappy(), "Atlantis");
        assert!(series.is_empty());
        assert!(series.date_bounds().is_none());
    }

    #[test]
    fn test_slice_at_last_date_is_unchanged() {
        let series = filter_by_location(&gappy(), "Poland");
        let sliced = slice_by_date(&series, day(5));
        assert_eq!(sliced, series);
    }

    #[test]
    fn test_slice_before_first_date_is_empty() {
        let series = filter_by_location(&gappy(), "Poland");
        let sliced = slice_by_date(&series, NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
        assert!(sliced.is_empty());
    }

    #[test]
    fn test_slice_clamps_future_cutoff() {
        let series = filter_by_location(&gappy(), "Poland");
        let sliced = slice_by_date(&series, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        assert_eq!(sliced.len(), 5);
        assert_eq!(sliced.date_bounds(), series.date_bounds());
        let sliced = slice_by_date(&series, day(3));
        assert_eq!(sliced.len(), 3);
        assert_eq!(sliced.rows()[2].date, day(3));
    }

    #[test]
    fn test_lethality_skips_zero_cases() {
        let data = dataset(vec![
            row("Poland", 1, vec![Some(0.0), None, Some(0.0), None, None]),
            row("Poland", 2, vec![Some(10.0), None, Some(1.0), None, None]),
        ]);
        let lethality = compute_lethality(&filter_by_location(&data, "Poland"));
        assert_eq!(
            lethality,
            vec![DateValue {
                date: day(2),
                value: 0.1
            }]
        );
    }

    #[test]
    fn test_lethality_missing_deaths_is_zero() {
        let data = dataset(vec![
            row("Poland", 1, vec![None, None, None, None, None]),
            row("Poland", 2, vec![Some(4.0), None, None, None, None]),
        ]);
        let lethality = compute_lethality(&filter_by_location(&data, "Poland"));
        assert_eq!(lethality.len(), 1);
        assert_eq!(lethality[0].value, 0.0);
    }

    #[test]
    fn test_lethality_without_cases_column() {
        let data = Dataset::new(
            vec!["total_deaths".to_string()],
            vec![row("Poland", 1, vec![Some(3.0)])],
        );
        assert!(compute_lethality(&filter_by_location(&data, "Poland")).is_empty());
    }

    #[test]
    fn test_lethality_against_factor() {
        let data = dataset(vec![
            row("Poland", 1, vec![Some(0.0), None, Some(0.0), Some(5.0), None]),
            row("Poland", 2, vec![Some(20.0), None, Some(1.0), Some(40.0), None]),
            row("Poland", 3, vec![Some(20.0), None, Some(2.0), None, None]),
        ]);
        let series = filter_by_location(&data, "Poland");
        let points = lethality_against_factor(&series, "stringency_index").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, day(2));
        assert_eq!(points[0].lethality, 0.05);
        assert_eq!(points[0].factor, Some(40.0));
        assert_eq!(points[1].factor, None);
    }

    #[test]
    fn test_lethality_against_unknown_factor() {
        let series = filter_by_location(&gappy(), "Poland");
        let err = lethality_against_factor(&series, "median_age").unwrap_err();
        assert_eq!(
            err,
            TransformError::UnknownField {
                field: "median_age".to_string()
            }
        );
    }

    #[test]
    fn test_snapshot_excludes_locations() {
        let data = dataset(vec![
            row("World", 1, vec![Some(1000.0), None, Some(10.0), None, None]),
            row("Poland", 1, vec![Some(10.0), None, Some(1.0), Some(20.0), None]),
            row("Germany", 1, vec![Some(30.0), None, None, None, None]),
            row("Poland", 2, vec![Some(12.0), None, Some(2.0), Some(15.0), None]),
        ]);
        let snapshots = snapshot_all_locations(&data, &["World"]);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].location, "Poland");
        assert_eq!(snapshots[1].location, "Germany");
        assert_eq!(snapshots[0].get("total_cases"), Some(12.0));
        assert_eq!(snapshots[0].get("stringency_index"), Some(20.0));
        assert_eq!(snapshots[0].get("new_cases"), None);
        assert_eq!(snapshots[1].get("total_deaths"), None);
    }

    #[test]
    fn test_aggregate_locations() {
        let mut world = row("World", 1, vec![None; 5]);
        world.iso_code = Some("OWID_WRL".to_string());
        let mut kosovo = row("Kosovo", 1, vec![None; 5]);
        kosovo.iso_code = Some("OWID_KOS".to_string());
        let mut poland = row("Poland", 1, vec![None; 5]);
        poland.iso_code = Some("POL".to_string());
        let mut upper = row("Upper-middle-income countries", 1, vec![None; 5]);
        upper.iso_code = Some("OWID_UMC".to_string());
        let locations = aggregate_locations(&dataset(vec![world, kosovo, poland, upper]));
        assert!(locations.contains(&"World".to_string()));
        assert!(locations.contains(&"Europe".to_string()));
        assert!(locations.contains(&"Upper-middle-income countries".to_string()));
        assert!(!locations.contains(&"Kosovo".to_string()));
        assert!(!locations.contains(&"Poland".to_string()));
        assert_eq!(locations.iter().filter(|l| *l == "World").count(), 1);
    }

    #[test]
    fn test_owid_territories_stay_on_map() {
        let mut kosovo = row("Kosovo", 1, vec![Some(5.0), None, None, None, None]);
        kosovo.iso_code = Some("OWID_KOS".to_string());
        let mut world = row("World", 1, vec![Some(50.0), None, None, None, None]);
        world.iso_code = Some("OWID_WRL".to_string());
        let data = dataset(vec![kosovo, world]);
        let snapshots = snapshot_all_locations(&data, &aggregate_locations(&data));
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].location, "Kosovo");
        assert_eq!(snapshots[0].get("total_cases"), Some(5.0));
    }

    #[test]
    fn test_summarize_latest() {
        let filled = forward_fill_cumulative(&gappy(), &cumulative());
        let summary = summarize_latest(&filter_by_location(&filled, "Poland")).unwrap();
        assert_eq!(summary.location, "Poland");
        assert_eq!(summary.date, day(5));
        assert_eq!(summary.population, Some(38_000_000));
        assert_eq!(summary.total_cases, Some(9));
        assert_eq!(summary.stringency_index, Some(30.0));
        assert_eq!(summary.people_fully_vaccinated, None);
    }

    #[test]
    fn test_summarize_empty_series() {
        let series = filter_by_location(&gappy(), "Atlantis");
        let err = summarize_latest(&series).unwrap_err();
        assert_eq!(
            err,
            TransformError::EmptySeries {
                location: "Atlantis".to_string()
            }
        );
    }

    #[test]
    fn test_series_values_unknown_field() {
        let series = filter_by_location(&gappy(), "Poland");
        assert!(series.values("total_tests").is_err());
        assert_eq!(series.values("total_cases").unwrap().len(), 5);
    }
}
