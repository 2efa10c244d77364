use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::WebDriverError;
use crate::version::VersionNumber;

/// Bucket listing of the legacy chromedriver storage.
pub const DEFAULT_STORAGE_INDEX_URL: &str = "https://chromedriver.storage.googleapis.com/";

/// Chrome for Testing catalog of every known-good build with its downloads.
pub const DEFAULT_KNOWN_GOOD_URL: &str =
    "https://googlechromelabs.github.io/chrome-for-testing/known-good-versions-with-downloads.json";

/// Default folder name under the local data directory.
pub const DEFAULT_APP_NAME: &str = "chromedriver-manager";

/// Time allowed to establish a connection (30 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest pause between two reads of a response (60 seconds). There is no
/// limit on the total time, so large archives on slow links still complete.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Host platform as named by the two driver catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Win32,
    Win64,
    Linux64,
    MacX64,
    MacArm64,
}

impl Platform {
    /// Determines the platform from the compile-time OS and architecture.
    pub fn current() -> Result<Self, WebDriverError> {
        Self::from_os_arch(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_os_arch(os: &str, arch: &str) -> Result<Self, WebDriverError> {
        match (os, arch) {
            ("windows", "x86_64") => Ok(Platform::Win64),
            ("windows", "x86") => Ok(Platform::Win32),
            ("macos", "x86_64") => Ok(Platform::MacX64),
            ("macos", "aarch64") => Ok(Platform::MacArm64),
            ("linux", "x86_64") => Ok(Platform::Linux64),
            _ => Err(WebDriverError::UnsupportedPlatform(format!("{}-{}", os, arch))),
        }
    }

    /// Platform id used in the known-good JSON catalog.
    pub fn known_good_id(&self) -> &'static str {
        match self {
            Platform::Win32 => "win32",
            Platform::Win64 => "win64",
            Platform::Linux64 => "linux64",
            Platform::MacX64 => "mac-x64",
            Platform::MacArm64 => "mac-arm64",
        }
    }

    /// Archive names used by keys in the storage index.
    ///
    /// The legacy storage only ever published 32-bit Windows builds, and
    /// named Apple Silicon builds `mac64_m1` before switching to `mac_arm64`.
    pub fn storage_suffixes(&self) -> &'static [&'static str] {
        match self {
            Platform::Win32 | Platform::Win64 => &["chromedriver_win32.zip"],
            Platform::Linux64 => &["chromedriver_linux64.zip"],
            Platform::MacX64 => &["chromedriver_mac64.zip"],
            Platform::MacArm64 => &["chromedriver_mac_arm64.zip", "chromedriver_mac64_m1.zip"],
        }
    }

    /// File name of the driver executable inside the archive and on disk.
    pub fn driver_file_name(&self) -> &'static str {
        match self {
            Platform::Win32 | Platform::Win64 => "chromedriver.exe",
            _ => "chromedriver",
        }
    }
}

/// Settings shared by every install call.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Folder name used for the default destination directory.
    pub app_name: String,
    pub storage_index_url: String,
    pub known_good_url: String,
    pub platform: Platform,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl ManagerConfig {
    /// Configuration for the current host with the public catalog URLs.
    pub fn for_current_platform() -> Result<Self, WebDriverError> {
        Ok(Self::with_platform(Platform::current()?))
    }

    pub fn with_platform(platform: Platform) -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            storage_index_url: DEFAULT_STORAGE_INDEX_URL.to_string(),
            known_good_url: DEFAULT_KNOWN_GOOD_URL.to_string(),
            platform,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, WebDriverError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("chromedriver-manager/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .build()?;
        Ok(client)
    }
}

/// Per-call options for [`crate::installer::DriverInstaller::install`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Directory receiving the driver; defaults to the app data directory.
    pub destination_dir: Option<PathBuf>,
    /// Version to match; defaults to the installed browser's version.
    pub version: Option<VersionNumber>,
    /// Browser executable to read the version from instead of searching for it.
    pub browser_path: Option<PathBuf>,
}

/// Returns `<local data dir>/<app_name>`, creating it if needed.
/// Falls back to `./<app_name>` when the platform has no data directory.
pub fn ensure_app_data_dir(app_name: &str) -> Result<PathBuf, WebDriverError> {
    let dir = app_data_dir_with_base(dirs::data_local_dir(), app_name);
    create_dir(&dir)?;
    Ok(dir)
}

fn app_data_dir_with_base(base: Option<PathBuf>, app_name: &str) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(app_name)
}

pub(crate) fn create_dir(dir: &Path) -> Result<(), WebDriverError> {
    std::fs::create_dir_all(dir).map_err(|e| WebDriverError::IoError {
        path: dir.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("windows", "x86_64", Platform::Win64)]
    #[case("windows", "x86", Platform::Win32)]
    #[case("linux", "x86_64", Platform::Linux64)]
    #[case("macos", "x86_64", Platform::MacX64)]
    #[case("macos", "aarch64", Platform::MacArm64)]
    fn from_os_arch_maps_supported_hosts(
        #[case] os: &str,
        #[case] arch: &str,
        #[case] expected: Platform,
    ) {
        assert_eq!(Platform::from_os_arch(os, arch).unwrap(), expected);
    }

    #[test]
    fn from_os_arch_rejects_unknown_hosts() {
        let err = Platform::from_os_arch("freebsd", "x86_64").unwrap_err();
        assert!(matches!(err, WebDriverError::UnsupportedPlatform(p) if p == "freebsd-x86_64"));
    }

    #[test]
    fn win64_uses_the_win32_storage_archive() {
        assert_eq!(Platform::Win64.storage_suffixes(), ["chromedriver_win32.zip"]);
        assert_eq!(Platform::Win64.known_good_id(), "win64");
        assert_eq!(Platform::Win64.driver_file_name(), "chromedriver.exe");
        assert_eq!(Platform::Linux64.driver_file_name(), "chromedriver");
    }

    #[test]
    fn mac_arm64_accepts_both_apple_silicon_archive_names() {
        assert_eq!(
            Platform::MacArm64.storage_suffixes(),
            ["chromedriver_mac_arm64.zip", "chromedriver_mac64_m1.zip"]
        );
    }

    #[test]
    fn app_data_dir_uses_base_when_available() {
        let dir = app_data_dir_with_base(Some(PathBuf::from("/data")), "drivers");
        assert_eq!(dir, PathBuf::from("/data/drivers"));
    }

    #[test]
    fn app_data_dir_falls_back_to_current_dir() {
        let dir = app_data_dir_with_base(None, "drivers");
        assert_eq!(dir, PathBuf::from("./drivers"));
    }
}
