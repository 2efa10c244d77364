//! Chrome for Testing "known good versions" JSON catalog.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::WebDriverError;
use crate::sources::{CandidateSource, DriverCandidate};
use crate::version::VersionNumber;

/// Represents a single download URL for a specific platform.
#[derive(Debug, Deserialize)]
struct Download {
    platform: String,
    url: String,
}

/// Represents the available downloads for a specific version.
#[derive(Debug, Deserialize)]
struct VersionDownloads {
    // Builds older than 115 carry no 'chromedriver' key at all.
    #[serde(default)]
    chromedriver: Vec<Download>,
}

/// Represents a single version entry in the main JSON response.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct VersionEntry {
    version: String,
    revision: String,
    downloads: VersionDownloads,
}

/// The top-level structure of the JSON response.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct KnownGoodVersions {
    timestamp: String,
    versions: Vec<VersionEntry>,
}

pub struct KnownGoodSource {
    client: reqwest::Client,
    url: String,
    platform_id: String,
}

impl KnownGoodSource {
    /// `platform_id` is the catalog's platform name, e.g. `win64` or `linux64`.
    pub fn new(client: reqwest::Client, url: &str, platform_id: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            platform_id: platform_id.to_string(),
        }
    }

    /// Parses the catalog and keeps the entries with a driver for the platform.
    pub fn parse_catalog(&self, body: &str) -> Result<Vec<DriverCandidate>, WebDriverError> {
        let catalog: KnownGoodVersions =
            serde_json::from_str(body).map_err(|e| WebDriverError::JsonParseError {
                url: self.url.clone(),
                source: e,
            })?;

        let candidates = catalog
            .versions
            .into_iter()
            .filter_map(|entry| {
                let download = entry
                    .downloads
                    .chromedriver
                    .into_iter()
                    .find(|d| d.platform == self.platform_id)?;
                match VersionNumber::parse(&entry.version) {
                    Ok(version) => Some(DriverCandidate::new(version, download.url)),
                    Err(e) => {
                        debug!("Ignoring catalog entry '{}': {}", entry.version, e);
                        None
                    }
                }
            })
            .collect();

        Ok(candidates)
    }
}

#[async_trait]
impl CandidateSource for KnownGoodSource {
    fn name(&self) -> &str {
        "known-good catalog"
    }

    async fn fetch_candidates(&self) -> Result<Vec<DriverCandidate>, WebDriverError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        self.parse_catalog(&body)
    }
}
