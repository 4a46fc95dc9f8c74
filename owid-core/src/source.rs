//! Remote loading of the dataset over HTTP.
//!
//! There is no retry: a failed fetch is surfaced to the caller as a
//! [`LoadError`] and the render pass stops.

use log::info;
use reqwest::Client;

use crate::dataset::Dataset;
use crate::error::{LoadError, Result};

/// Published location of the full OWID COVID-19 CSV.
pub const DEFAULT_SOURCE_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

/// Download the raw CSV body.
pub async fn fetch_csv(client: &Client, url: &str) -> Result<String> {
    info!("Fetching dataset from {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }
    let body = response.text().await?;
    info!("Fetched {} bytes", body.len());
    Ok(body)
}

/// Download and parse the dataset.
pub async fn fetch_dataset(client: &Client, url: &str) -> Result<Dataset> {
    let body = fetch_csv(client, url).await?;
    Dataset::from_csv_str(&body)
}
