//! Installs the chromedriver build matching a browser version.
//!
//! Installs to the same destination are not serialized; callers running
//! several installs at once must give each a distinct destination.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::browser::{
    BrowserLocator, CommandVersionReader, SystemBrowserLocator, VersionReader,
    detect_browser_version,
};
use crate::config::{InstallOptions, ManagerConfig, create_dir, ensure_app_data_dir};
use crate::downloader::{download_file, extract_named_entry, scratch_dir};
use crate::error::WebDriverError;
use crate::reconciler::find_best_match;
use crate::sources::{
    CandidateSource, DriverCandidate, KnownGoodSource, StorageIndexSource, collect_candidates,
};
use crate::version::VersionNumber;

/// Terminal state of one install call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A new driver was downloaded and written to `path`.
    Installed { path: PathBuf, version: VersionNumber },
    /// The driver at `path` already has the matched version.
    UpToDate { path: PathBuf, version: VersionNumber },
    Failed { reason: String },
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, InstallOutcome::Failed { .. })
    }

    fn failed(reason: impl Into<String>) -> Self {
        InstallOutcome::Failed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Installed { path, version } => {
                write!(f, "Installed chromedriver {} at {}", version, path.display())
            }
            InstallOutcome::UpToDate { path, version } => {
                write!(f, "chromedriver {} at {} is up to date", version, path.display())
            }
            InstallOutcome::Failed { reason } => write!(f, "Install failed: {}", reason),
        }
    }
}

pub struct DriverInstaller {
    config: ManagerConfig,
    client: reqwest::Client,
    sources: Vec<Box<dyn CandidateSource>>,
    locator: Box<dyn BrowserLocator>,
    reader: Box<dyn VersionReader>,
}

impl DriverInstaller {
    /// Creates an installer querying the storage index first, then the
    /// known-good catalog.
    pub fn new(config: ManagerConfig) -> Result<Self, WebDriverError> {
        let client = config.http_client()?;
        let sources: Vec<Box<dyn CandidateSource>> = vec![
            Box::new(StorageIndexSource::new(
                client.clone(),
                &config.storage_index_url,
                config.platform.storage_suffixes(),
            )),
            Box::new(KnownGoodSource::new(
                client.clone(),
                &config.known_good_url,
                config.platform.known_good_id(),
            )),
        ];

        Ok(Self {
            config,
            client,
            sources,
            locator: Box::new(SystemBrowserLocator),
            reader: Box::new(CommandVersionReader),
        })
    }

    /// Replaces the catalogs. Pool order follows the order given here.
    pub fn with_sources(mut self, sources: Vec<Box<dyn CandidateSource>>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_browser_locator(mut self, locator: impl BrowserLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Replaces how versions are read from the browser and installed driver.
    pub fn with_version_reader(mut self, reader: impl VersionReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Resolves the version to install for, detecting the browser if needed.
    pub async fn target_version(
        &self,
        options: &InstallOptions,
    ) -> Result<VersionNumber, WebDriverError> {
        match options.version {
            Some(version) => Ok(version),
            None => {
                detect_browser_version(
                    options.browser_path.as_deref(),
                    self.locator.as_ref(),
                    self.reader.as_ref(),
                )
                .await
            }
        }
    }

    /// Queries every catalog and returns the closest build to `requested`.
    pub async fn find_candidate(&self, requested: &VersionNumber) -> Option<DriverCandidate> {
        let pool = collect_candidates(&self.sources).await;
        find_best_match(&pool, requested).cloned()
    }

    /// Installs or updates the driver.
    ///
    /// Only a failure to determine the target version is returned as an
    /// error; everything after that ends in an [`InstallOutcome`].
    pub async fn install(
        &self,
        options: &InstallOptions,
        cancel: &CancellationToken,
    ) -> Result<InstallOutcome, WebDriverError> {
        let requested = self.target_version(options).await?;

        let destination_dir = match &options.destination_dir {
            Some(dir) => dir.clone(),
            None => match ensure_app_data_dir(&self.config.app_name) {
                Ok(dir) => dir,
                Err(e) => {
                    warn!("No destination directory: {}", e);
                    return Ok(InstallOutcome::failed(e.to_string()));
                }
            },
        };
        let destination = destination_dir.join(self.config.platform.driver_file_name());
        info!("Looking for chromedriver matching {}", requested);

        let candidate = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(InstallOutcome::failed(WebDriverError::Cancelled.to_string())),
            candidate = self.find_candidate(&requested) => candidate,
        };
        let Some(candidate) = candidate else {
            warn!("No downloads available for version {}", requested);
            return Ok(InstallOutcome::failed(format!(
                "no downloads available for version {}",
                requested
            )));
        };
        info!("Selected chromedriver {} from {}", candidate.version, candidate.download_url);

        if self.installed_version(&destination).await == Some(candidate.version) {
            info!("{} is already at {}", destination.display(), candidate.version);
            return Ok(InstallOutcome::UpToDate {
                path: destination,
                version: candidate.version,
            });
        }

        match self.download_and_install(&candidate, &destination, cancel).await {
            Ok(path) => {
                info!("Installed chromedriver {} to {}", candidate.version, path.display());
                Ok(InstallOutcome::Installed {
                    path,
                    version: candidate.version,
                })
            }
            Err(e) => {
                warn!("Failed to install chromedriver {}: {}", candidate.version, e);
                Ok(InstallOutcome::failed(e.to_string()))
            }
        }
    }

    /// Version of the driver already at `path`, if there is a readable one.
    async fn installed_version(&self, path: &Path) -> Option<VersionNumber> {
        if !path.is_file() {
            return None;
        }
        let text = self.reader.read_version(path).await?;
        VersionNumber::parse(&text).ok()
    }

    /// The download is abandoned as soon as `cancel` fires. Extraction runs on
    /// a blocking thread and is always awaited, so by the time this returns
    /// the destination either holds the new driver or was never touched.
    async fn download_and_install(
        &self,
        candidate: &DriverCandidate,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, WebDriverError> {
        if let Some(dir) = destination.parent() {
            create_dir(dir)?;
        }

        // Dropping the guard removes the archive on every exit path.
        let scratch = scratch_dir()?;
        let archive_path = scratch.path().join("chromedriver.zip");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(WebDriverError::Cancelled),
            result = download_file(&self.client, &candidate.download_url, &archive_path) => result?,
        }
        extract_named_entry(
            &archive_path,
            self.config.platform.driver_file_name(),
            destination,
            cancel.clone(),
        )
        .await
    }
}
