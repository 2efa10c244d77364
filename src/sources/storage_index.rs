//! Legacy chromedriver storage bucket.
//!
//! The bucket listing is an XML document with one `<Key>` per object, e.g.
//! `<Key>114.0.5735.90/chromedriver_linux64.zip</Key>`. Only the keys are of
//! interest, so the listing is scanned textually instead of parsed as XML.

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::error::WebDriverError;
use crate::sources::{CandidateSource, DriverCandidate};
use crate::version::VersionNumber;

pub struct StorageIndexSource {
    client: reqwest::Client,
    base_url: String,
    suffixes: Vec<String>,
    key_re: Regex,
}

impl StorageIndexSource {
    /// `suffixes` are the archive names for the platform, e.g. `chromedriver_win32.zip`.
    pub fn new(client: reqwest::Client, base_url: &str, suffixes: &[&str]) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            suffixes: suffixes.iter().map(|s| s.to_ascii_lowercase()).collect(),
            key_re: Regex::new(r"<Key>([^<]*)</Key>").unwrap(),
        }
    }

    /// Extracts candidates from a bucket listing. Keys with a malformed
    /// version segment are skipped without affecting the other keys.
    pub fn parse_listing(&self, listing: &str) -> Vec<DriverCandidate> {
        self.key_re
            .captures_iter(listing)
            .filter_map(|caps| {
                let key = caps.get(1)?.as_str().trim();
                let lower = key.to_ascii_lowercase();
                if !self.suffixes.iter().any(|suffix| lower.ends_with(suffix.as_str())) {
                    return None;
                }
                let version_text = key.split('/').next()?;
                match VersionNumber::parse(version_text) {
                    Ok(version) => Some(DriverCandidate::new(version, self.download_url(key))),
                    Err(e) => {
                        debug!("Ignoring storage key '{}': {}", key, e);
                        None
                    }
                }
            })
            .collect()
    }

    fn download_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl CandidateSource for StorageIndexSource {
    fn name(&self) -> &str {
        "storage index"
    }

    async fn fetch_candidates(&self) -> Result<Vec<DriverCandidate>, WebDriverError> {
        let listing = self
            .client
            .get(&self.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(self.parse_listing(&listing))
    }
}
