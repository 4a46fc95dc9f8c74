//! Choropleth layer export.
//!
//! Geometry lives with the map renderer; this side only ships the values
//! keyed by ISO code, plus a normalised intensity for the colour scale.

use owid_data::models::MapValue;
use serde::Serialize;

use crate::error::ChartError;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChoroplethRegion<'a> {
    pub iso_code: &'a str,
    pub location: &'a str,
    pub value: f64,
    /// `value` scaled linearly into [0, 1] between the layer's min and max.
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Choropleth<'a> {
    pub field: &'a str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub regions: Vec<ChoroplethRegion<'a>>,
}

impl<'a> Choropleth<'a> {
    pub fn new(field: &'a str, values: &'a [MapValue]) -> Self {
        let min = values.iter().map(|v| v.value).reduce(f64::min);
        let max = values.iter().map(|v| v.value).reduce(f64::max);
        let span = match (min, max) {
            (Some(lo), Some(hi)) if hi > lo => Some((lo, hi - lo)),
            _ => None,
        };
        let regions = values
            .iter()
            .map(|v| ChoroplethRegion {
                iso_code: &v.iso_code,
                location: &v.location,
                value: v.value,
                intensity: span.map_or(1.0, |(lo, width)| (v.value - lo) / width),
            })
            .collect();
        Choropleth {
            field,
            min,
            max,
            regions,
        }
    }
}

/// The map layer as pretty-printed JSON.
pub fn choropleth_json(field: &str, values: &[MapValue]) -> Result<String, ChartError> {
    if values.is_empty() {
        return Err(ChartError::NoData(format!("map of {}", field)));
    }
    Ok(serde_json::to_string_pretty(&Choropleth::new(field, values))?)
}
