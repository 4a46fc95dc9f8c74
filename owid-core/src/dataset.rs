//! In-memory dataset and CSV parsing.
//!
//! # CSV Format
//!
//! Headers are required. `location` and `date` (`YYYY-MM-DD`) must be
//! present; `iso_code` and `continent` are kept as text when present; every
//! other column except `tests_units` is parsed as a number.
//!
//! ```text
//! iso_code,continent,location,date,total_cases,new_cases,stringency_index
//! POL,Europe,Poland,2020-03-04,1,1,
//! POL,Europe,Poland,2020-03-05,1,0,25.0
//! ```

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::date_range::DateBounds;
use crate::error::{LoadError, Result};
use crate::field::{self, CATEGORICAL, CONTINENT, DATE, FACTORS, ISO_CODE, LOCATION};
use crate::observation::Observation;
use crate::DATE_FORMAT;

/// An ordered sequence of observations sharing one numeric schema.
///
/// Never mutated in place; transformations build a new `Dataset` that
/// shares the schema through the `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    fields: Arc<[String]>,
    rows: Vec<Observation>,
}

impl Dataset {
    pub fn new(fields: Vec<String>, rows: Vec<Observation>) -> Self {
        Dataset {
            fields: fields.into(),
            rows,
        }
    }

    /// A dataset with the same schema and different rows.
    pub fn with_rows(&self, rows: Vec<Observation>) -> Self {
        Dataset {
            fields: Arc::clone(&self.fields),
            rows,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a numeric column.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_index(name).is_some()
    }

    /// Columns forward-filled as running totals, in schema order.
    pub fn cumulative_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| field::is_cumulative(f))
            .cloned()
            .collect()
    }

    /// The factor allow-list restricted to columns that actually loaded.
    pub fn available_factors(&self) -> Vec<&'static str> {
        FACTORS
            .iter()
            .copied()
            .filter(|f| self.has_field(f))
            .collect()
    }

    /// Distinct locations in order of first appearance.
    pub fn locations(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.rows
            .iter()
            .filter(|obs| seen.insert(obs.location.as_str()))
            .map(|obs| obs.location.clone())
            .collect()
    }

    pub fn date_bounds(&self) -> Option<DateBounds> {
        DateBounds::from_dates(self.rows.iter().map(|obs| obs.date))
    }

    pub fn from_csv_str(csv_object: &str) -> Result<Self> {
        Self::from_reader(csv_object.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Parse a CSV stream.
    ///
    /// Absent key columns or a malformed date are fatal; empty or non-numeric
    /// cells in numeric columns become `None`. Rows with an empty location
    /// are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let location_col = column(LOCATION).ok_or(LoadError::MissingColumn(LOCATION))?;
        let date_col = column(DATE).ok_or(LoadError::MissingColumn(DATE))?;
        let iso_col = column(ISO_CODE);
        let continent_col = column(CONTINENT);
        let numeric: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !CATEGORICAL.contains(&h.trim()))
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        let mut rows = Vec::new();
        let mut unparsed = 0u64;
        let mut skipped = 0u64;
        for result in rdr.records() {
            let record = result?;
            let location = record.get(location_col).unwrap_or("").trim();
            if location.is_empty() {
                skipped += 1;
                continue;
            }
            let date_str = record.get(date_col).unwrap_or("").trim();
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|_| {
                LoadError::InvalidDate {
                    line: record.position().map_or(0, |p| p.line()),
                    value: date_str.to_string(),
                }
            })?;
            let values = numeric
                .iter()
                .map(|(i, _)| {
                    let (value, ok) = parse_number(record.get(*i).unwrap_or(""));
                    if !ok {
                        unparsed += 1;
                    }
                    value
                })
                .collect();
            rows.push(Observation {
                location: location.to_string(),
                date,
                iso_code: text_cell(&record, iso_col),
                continent: text_cell(&record, continent_col),
                values,
            });
        }

        if unparsed > 0 {
            debug!("loader: {} non-numeric cells treated as missing", unparsed);
        }
        if skipped > 0 {
            debug!("loader: skipped {} rows without a location", skipped);
        }
        let fields = numeric.into_iter().map(|(_, name)| name).collect();
        let dataset = Dataset::new(fields, rows);
        info!(
            "loader: loaded {} observations, {} numeric columns",
            dataset.len(),
            dataset.fields().len()
        );
        Ok(dataset)
    }
}

/// Returns the parsed value and whether the cell was well-formed.
fn parse_number(cell: &str) -> (Option<f64>, bool) {
    let cell = cell.trim();
    if cell.is_empty() {
        return (None, true);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => (Some(v), true),
        _ => (None, false),
    }
}

fn text_cell(record: &StringRecord, col: Option<usize>) -> Option<String> {
    col.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
