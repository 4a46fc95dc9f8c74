/// Error types for loading and transforming the dataset
use thiserror::Error;

/// Failure to obtain or parse the dataset. Fatal to a render pass.
#[derive(Error, Debug)]
pub enum LoadError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Source answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Failed to read a local file
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A key column is absent from the header
    #[error("Missing mandatory column: {0}")]
    MissingColumn(&'static str),

    /// A date cell is not ISO-8601
    #[error("Invalid date {value:?} on line {line}")]
    InvalidDate { line: u64, value: String },
}

/// Conditions raised by the series transformer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A scalar summary was requested over zero rows
    #[error("No data for location: {location}")]
    EmptySeries { location: String },

    /// The requested field is not part of the loaded schema
    #[error("Unknown field: {field}")]
    UnknownField { field: String },
}

/// Type alias for Results using LoadError
pub type Result<T> = std::result::Result<T, LoadError>;
