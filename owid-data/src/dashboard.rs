//! One full recomputation of every dashboard view for a user selection.
//!
//! The selection is owned by the presentation layer and passed in as plain
//! values; nothing here reads ambient state. A newer selection simply
//! produces a newer [`DashboardView`].

use chrono::NaiveDate;
use log::{info, warn};
use owid_core::date_range::DateBounds;
use owid_core::field::TOTAL_CASES;
use owid_core::{Dataset, TransformError};
use serde::Serialize;

use crate::models::{DateValue, DualAxisPoint, FactorPoint, LocationSummary, MapValue};
use crate::transform::{
    aggregate_locations, compute_lethality, filter_by_location, forward_fill_cumulative,
    lethality_against_factor, slice_by_date, snapshot_all_locations, summarize_latest,
};
use crate::views;

/// What the user picked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub location: String,
    /// Last date to show; clamped to the series.
    pub cutoff: Option<NaiveDate>,
    /// Field correlated against lethality.
    pub factor: Option<String>,
    /// Field shown on the map; total cases when unset.
    pub map_field: Option<String>,
}

impl Selection {
    pub fn location(location: &str) -> Self {
        Selection {
            location: location.to_string(),
            cutoff: None,
            factor: None,
            map_field: None,
        }
    }
}

/// A panel either has content or explains why it is blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum DisplayState<T> {
    Ready(T),
    NoData { reason: String },
}

impl<T> DisplayState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, DisplayState::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            DisplayState::Ready(value) => Some(value),
            DisplayState::NoData { .. } => None,
        }
    }
}

/// Both empty series and unknown fields show up as a blank panel.
impl<T> From<Result<T, TransformError>> for DisplayState<T> {
    fn from(result: Result<T, TransformError>) -> Self {
        match result {
            Ok(value) => DisplayState::Ready(value),
            Err(e) => DisplayState::NoData {
                reason: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorView {
    pub factor: String,
    pub points: Vec<FactorPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub field: String,
    pub values: Vec<MapValue>,
}

/// Everything the presentation layer draws for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    /// Selectable range for the cutoff slider, over the full series.
    pub bounds: Option<DateBounds>,
    pub summary: DisplayState<LocationSummary>,
    pub cumulative_cases: Vec<DateValue>,
    pub new_cases: Vec<DateValue>,
    pub new_cases_smoothed: Vec<DateValue>,
    pub stringency: Vec<DualAxisPoint>,
    pub lethality: Vec<DateValue>,
    pub factor: Option<DisplayState<FactorView>>,
    pub map: DisplayState<MapLayer>,
}

/// Recompute all views from the raw dataset.
///
/// Running totals are forward-filled over the whole dataset first, so every
/// location's fill only sees its own history.
pub fn render_pass(dataset: &Dataset, selection: &Selection) -> DashboardView {
    let filled = forward_fill_cumulative(dataset, &dataset.cumulative_fields());
    let full = filter_by_location(&filled, &selection.location);
    let bounds = full.date_bounds();
    let series = match selection.cutoff {
        Some(cutoff) => slice_by_date(&full, cutoff),
        None => full,
    };
    info!(
        "render pass: {} rows for {} (cutoff {:?})",
        series.len(),
        selection.location,
        selection.cutoff
    );

    let summary = DisplayState::from(summarize_latest(&series));
    if let DisplayState::NoData { reason } = &summary {
        warn!("{}", reason);
    }

    let factor = selection.factor.as_ref().map(|factor| {
        DisplayState::from(
            lethality_against_factor(&series, factor).map(|points| FactorView {
                factor: factor.clone(),
                points,
            }),
        )
    });

    DashboardView {
        selection: selection.clone(),
        bounds,
        summary,
        cumulative_cases: views::cumulative_cases(&series),
        new_cases: views::daily_new_cases(&series),
        new_cases_smoothed: views::daily_new_cases_smoothed(&series),
        stringency: views::stringency_overlay(&series),
        lethality: compute_lethality(&series),
        factor,
        map: map_layer(&filled, selection),
    }
}

fn map_layer(filled: &Dataset, selection: &Selection) -> DisplayState<MapLayer> {
    let field = selection
        .map_field
        .clone()
        .unwrap_or_else(|| TOTAL_CASES.to_string());
    if !filled.has_field(&field) {
        return DisplayState::NoData {
            reason: TransformError::UnknownField { field }.to_string(),
        };
    }
    let dated = match selection.cutoff {
        Some(cutoff) => filled.with_rows(
            filled
                .rows()
                .iter()
                .filter(|obs| obs.date <= cutoff)
                .cloned()
                .collect(),
        ),
        None => filled.clone(),
    };
    let snapshots = snapshot_all_locations(&dated, &aggregate_locations(filled));
    let values = views::map_values(&snapshots, &field);
    DisplayState::Ready(MapLayer { field, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{dataset, day, row};
    use owid_core::Observation;

    const STRINGENCY_IDX: usize = 3;

    fn with_iso(mut obs: Observation, iso: &str) -> Observation {
        obs.iso_code = Some(iso.to_string());
        obs
    }

    /// Three locations, four dates; Poland has no stringency on day 2.
    fn three_by_four() -> Dataset {
        let mut rows = Vec::new();
        for d in 1..=4 {
            let n = d as f64;
            let poland = vec![
                Some(10.0 * n),
                Some(10.0),
                Some(n),
                (d != 2).then_some(20.0 + n),
                Some(38.0e6),
            ];
            let germany = vec![Some(20.0 * n), Some(20.0), Some(2.0 * n), Some(50.0), Some(83.0e6)];
            let world = vec![Some(1000.0 * n), Some(1000.0), Some(10.0 * n), None, Some(7.9e9)];
            rows.push(with_iso(row("Poland", d, poland), "POL"));
            rows.push(with_iso(row("Germany", d, germany), "DEU"));
            rows.push(with_iso(row("World", d, world), "OWID_WRL"));
        }
        dataset(rows)
    }

    #[test]
    fn test_end_to_end_slice_and_fill() {
        let selection = Selection {
            cutoff: Some(day(3)),
            ..Selection::location("Poland")
        };
        let filled = forward_fill_cumulative(&three_by_four(), &three_by_four().cumulative_fields());
        let series = slice_by_date(&filter_by_location(&filled, "Poland"), day(3));
        assert_eq!(series.len(), 3);
        assert_eq!(series.rows()[1].value(STRINGENCY_IDX), Some(21.0));
        assert_eq!(
            series.rows()[1].value(STRINGENCY_IDX),
            series.rows()[0].value(STRINGENCY_IDX)
        );

        let view = render_pass(&three_by_four(), &selection);
        assert_eq!(view.cumulative_cases.len(), 3);
        assert_eq!(view.bounds, Some(DateBounds { first: day(1), last: day(4) }));
        let summary = view.summary.ready().unwrap();
        assert_eq!(summary.date, day(3));
        assert_eq!(summary.total_cases, Some(30));
        assert_eq!(summary.stringency_index, Some(23.0));
    }

    #[test]
    fn test_render_pass_unknown_location() {
        let view = render_pass(&three_by_four(), &Selection::location("Atlantis"));
        assert!(!view.summary.is_ready());
        assert!(view.cumulative_cases.is_empty());
        assert!(view.bounds.is_none());
        // the map does not depend on the selected location
        assert!(view.map.is_ready());
    }

    #[test]
    fn test_render_pass_map_excludes_aggregates() {
        let view = render_pass(&three_by_four(), &Selection::location("Poland"));
        let map = view.map.ready().unwrap();
        assert_eq!(map.field, "total_cases");
        let codes: Vec<&str> = map.values.iter().map(|v| v.iso_code.as_str()).collect();
        assert_eq!(codes, vec!["POL", "DEU"]);
        assert_eq!(map.values[0].value, 40.0);
    }

    #[test]
    fn test_render_pass_map_respects_cutoff() {
        let selection = Selection {
            cutoff: Some(day(2)),
            ..Selection::location("Poland")
        };
        let view = render_pass(&three_by_four(), &selection);
        assert_eq!(view.map.ready().unwrap().values[1].value, 40.0);
    }

    #[test]
    fn test_render_pass_factor() {
        let selection = Selection {
            factor: Some("stringency_index".to_string()),
            ..Selection::location("Germany")
        };
        let view = render_pass(&three_by_four(), &selection);
        let factor = view.factor.unwrap();
        let factor = factor.ready().unwrap();
        assert_eq!(factor.points.len(), 4);
        assert_eq!(factor.points[0].lethality, 0.1);
        assert_eq!(factor.points[0].factor, Some(50.0));
        assert_eq!(view.lethality.len(), 4);
    }

    #[test]
    fn test_unknown_factor_is_no_data() {
        let selection = Selection {
            factor: Some("median_age".to_string()),
            map_field: Some("gdp_per_capita".to_string()),
            ..Selection::location("Germany")
        };
        let view = render_pass(&three_by_four(), &selection);
        assert!(!view.factor.unwrap().is_ready());
        assert!(!view.map.is_ready());
        assert!(view.summary.is_ready());
    }

    #[test]
    fn test_display_state_json() {
        let state = DisplayState::from(Err::<u32, _>(TransformError::EmptySeries {
            location: "Atlantis".to_string(),
        }));
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"state":"no_data","data":{"reason":"No data for location: Atlantis"}}"#
        );
    }
}
