//! Where the dataset comes from: a local copy or the published URL.

use anyhow::Context;
use clap::Args;
use owid_core::source::{fetch_dataset, DEFAULT_SOURCE_URL};
use owid_core::Dataset;
use std::path::PathBuf;
use std::time::Duration;

/// Network fetches of the full CSV can be slow; give them room.
const HTTP_TIMEOUT_SECS: u64 = 300;

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Local copy of the OWID CSV (see `fetch`)
    #[arg(short = 'd', long, conflicts_with = "url")]
    pub data: Option<PathBuf>,

    /// CSV to download when no local copy is given
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub url: String,
}

impl SourceArgs {
    /// Load the dataset. Failure here ends the command.
    pub async fn load(&self) -> anyhow::Result<Dataset> {
        match &self.data {
            Some(path) => Dataset::from_path(path)
                .with_context(|| format!("failed to load dataset from {}", path.display())),
            None => {
                let client = http_client()?;
                fetch_dataset(&client, &self.url)
                    .await
                    .with_context(|| format!("failed to load dataset from {}", self.url))
            }
        }
    }
}

pub fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?)
}
