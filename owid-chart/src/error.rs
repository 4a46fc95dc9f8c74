use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    /// Nothing to draw
    #[error("No data to chart: {0}")]
    NoData(String),

    /// plotters failed while drawing
    #[error("Failed to draw chart: {0}")]
    Draw(String),

    #[error("Failed to serialise chart data: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DrawingAreaErrorKind<std::io::Error>> for ChartError {
    fn from(e: DrawingAreaErrorKind<std::io::Error>) -> Self {
        ChartError::Draw(e.to_string())
    }
}
