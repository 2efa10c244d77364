//! Upstream driver catalogs, each normalized into a list of [`DriverCandidate`].

pub mod known_good;
pub mod storage_index;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::WebDriverError;
use crate::version::VersionNumber;

pub use known_good::KnownGoodSource;
pub use storage_index::StorageIndexSource;

/// A driver build offered by one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCandidate {
    pub version: VersionNumber,
    pub download_url: String,
}

impl DriverCandidate {
    pub fn new(version: VersionNumber, download_url: impl Into<String>) -> Self {
        Self {
            version,
            download_url: download_url.into(),
        }
    }
}

/// A catalog that lists downloadable driver builds for one platform.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Fetches the catalog and returns every build it offers for the platform.
    async fn fetch_candidates(&self) -> Result<Vec<DriverCandidate>, WebDriverError>;
}

/// Queries all sources concurrently and concatenates their results.
///
/// The pool keeps the order of `sources` regardless of which request finishes
/// first. A failing source contributes nothing and never fails the others.
pub async fn collect_candidates(sources: &[Box<dyn CandidateSource>]) -> Vec<DriverCandidate> {
    let results = join_all(sources.iter().map(|source| source.fetch_candidates())).await;

    let mut pool = Vec::new();
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(candidates) => {
                debug!("{} offered {} candidates", source.name(), candidates.len());
                pool.extend(candidates);
            }
            Err(e) => warn!("Skipping {}: {}", source.name(), e),
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct FixedSource {
        name: &'static str,
        delay: Duration,
        result: fn() -> Result<Vec<DriverCandidate>, WebDriverError>,
    }

    #[async_trait]
    impl CandidateSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_candidates(&self) -> Result<Vec<DriverCandidate>, WebDriverError> {
            tokio::time::sleep(self.delay).await;
            (self.result)()
        }
    }

    fn candidate(version: &str) -> DriverCandidate {
        DriverCandidate::new(VersionNumber::parse(version).unwrap(), format!("https://x/{version}"))
    }

    #[tokio::test]
    async fn collect_keeps_source_order_even_when_first_source_is_slower() {
        let sources: Vec<Box<dyn CandidateSource>> = vec![
            Box::new(FixedSource {
                name: "slow",
                delay: Duration::from_millis(50),
                result: || Ok(vec![candidate("114.0.5735.90")]),
            }),
            Box::new(FixedSource {
                name: "fast",
                delay: Duration::ZERO,
                result: || Ok(vec![candidate("115.0.5790.102"), candidate("114.0.5735.90")]),
            }),
        ];

        let pool = collect_candidates(&sources).await;

        assert_eq!(
            pool,
            vec![
                candidate("114.0.5735.90"),
                candidate("115.0.5790.102"),
                candidate("114.0.5735.90"),
            ]
        );
    }

    #[tokio::test]
    async fn collect_absorbs_a_failing_source() {
        let sources: Vec<Box<dyn CandidateSource>> = vec![
            Box::new(FixedSource {
                name: "broken",
                delay: Duration::ZERO,
                result: || Err(WebDriverError::Cancelled),
            }),
            Box::new(FixedSource {
                name: "healthy",
                delay: Duration::ZERO,
                result: || Ok(vec![candidate("115.0.5790.102")]),
            }),
        ];

        let pool = collect_candidates(&sources).await;

        assert_eq!(pool, vec![candidate("115.0.5790.102")]);
    }

    #[tokio::test]
    async fn collect_with_all_sources_failing_is_empty() {
        let sources: Vec<Box<dyn CandidateSource>> = vec![Box::new(FixedSource {
            name: "broken",
            delay: Duration::ZERO,
            result: || Err(WebDriverError::BrowserNotFound),
        })];

        assert!(collect_candidates(&sources).await.is_empty());
    }
}
