//! Retrieval of the raw miner status document.

use crate::error::{ExporterError, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Where a poll gets its JSON snapshot from.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    /// Unauthenticated GET against the miner's local API.
    Http { client: reqwest::Client, url: String },
    /// A static document on disk, used in place of a running miner.
    Fixture(PathBuf),
}

impl SnapshotSource {
    /// HTTP source with a bounded request timeout.
    pub fn http(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExporterError::fetch_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::Http {
            client,
            url: url.into(),
        })
    }

    pub fn fixture(path: impl Into<PathBuf>) -> Self {
        Self::Fixture(path.into())
    }

    /// Fetch and parse one snapshot.
    pub async fn fetch(&self) -> Result<Value> {
        match self {
            Self::Http { client, url } => {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ExporterError::fetch_error(format!("GET {}: {}", url, e)))?;
                response
                    .json::<Value>()
                    .await
                    .map_err(|e| ExporterError::parse_error(format!("{}: {}", url, e)))
            }
            Self::Fixture(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                serde_json::from_str(&content)
                    .map_err(|e| ExporterError::parse_error(format!("{}: {}", path.display(), e)))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http { url, .. } => url.clone(),
            Self::Fixture(path) => format!("file://{}", path.display()),
        }
    }
}
