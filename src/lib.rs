//! Finds, downloads and installs the chromedriver build matching the
//! installed Chrome.
//!
//! Driver builds are collected from two catalogs, the legacy storage bucket
//! and the Chrome for Testing known-good list, and the build sharing the
//! longest version prefix with the browser is installed.

pub mod browser;
pub mod config;
pub mod downloader;
pub mod error;
pub mod installer;
pub mod reconciler;
pub mod sources;
pub mod version;

pub use config::{InstallOptions, ManagerConfig, Platform};
pub use error::WebDriverError;
pub use installer::{DriverInstaller, InstallOutcome};
pub use sources::{CandidateSource, DriverCandidate};
pub use version::VersionNumber;
