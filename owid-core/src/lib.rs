//! Core types and loader for the Our World in Data COVID-19 time series.
//!
//! The dataset is a long-format table: one row per location per date, with
//! a few dozen numeric columns. This crate parses it into a [`Dataset`] and
//! knows which columns are which (see [`field`]).

pub mod date_range;
pub mod dataset;
pub mod error;
pub mod field;
pub mod observation;
#[cfg(feature = "api")]
pub mod source;

pub use dataset::Dataset;
pub use error::{LoadError, TransformError};
pub use observation::Observation;

/// Date format used by the OWID CSV: "YYYY-MM-DD"
pub const DATE_FORMAT: &str = "%Y-%m-%d";
