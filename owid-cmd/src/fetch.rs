//! Download the dataset once so later commands can run offline.

use anyhow::Context;
use log::info;
use owid_core::source::fetch_csv;
use owid_core::Dataset;
use std::path::Path;

use crate::source::http_client;

/// Fetch the CSV, check it parses, then write it unchanged.
pub async fn run_fetch(url: &str, output: &Path) -> anyhow::Result<()> {
    let client = http_client()?;
    let body = fetch_csv(&client, url)
        .await
        .with_context(|| format!("failed to fetch {}", url))?;
    let dataset = Dataset::from_csv_str(&body).context("downloaded CSV is malformed")?;
    info!(
        "{} observations for {} locations",
        dataset.len(),
        dataset.locations().len()
    );
    std::fs::write(output, &body)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("Fetch complete. Output: {}", output.display());
    Ok(())
}
