//! Presentation layer for the COVID-19 dashboard.
//!
//! - `svg`: line, bar and dual-axis charts drawn with plotters' SVG backend
//! - `map`: choropleth layer serialised to JSON for a map renderer

pub mod error;
pub mod map;
pub mod svg;

pub use error::ChartError;
