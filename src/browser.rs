//! Detection of the installed Chrome version.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::WebDriverError;
use crate::version::VersionNumber;

/// Finds the default browser executable on this machine.
pub trait BrowserLocator: Send + Sync {
    fn find_default_browser(&self) -> Option<PathBuf>;
}

/// Reads the version embedded in an executable, as raw text.
#[async_trait]
pub trait VersionReader: Send + Sync {
    async fn read_version(&self, path: &Path) -> Option<String>;
}

/// Looks for Chrome in the standard install locations of the host OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowserLocator;

impl BrowserLocator for SystemBrowserLocator {
    fn find_default_browser(&self) -> Option<PathBuf> {
        find_chrome_path_system()
    }
}

/// Reads file version metadata on Windows and `--version` output elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandVersionReader;

#[async_trait]
impl VersionReader for CommandVersionReader {
    async fn read_version(&self, path: &Path) -> Option<String> {
        #[cfg(target_os = "windows")]
        if let Some(version) = read_file_version_windows(path).await {
            return Some(version);
        }
        read_version_from_cli(path).await
    }
}

/// Resolves the browser version to target.
///
/// An explicit `browser_path` wins over the locator. Fails with
/// [`WebDriverError::BrowserNotFound`] when neither yields a path and with
/// [`WebDriverError::VersionUnreadable`] when the executable reports no
/// parseable version.
pub async fn detect_browser_version(
    browser_path: Option<&Path>,
    locator: &dyn BrowserLocator,
    reader: &dyn VersionReader,
) -> Result<VersionNumber, WebDriverError> {
    let path = match browser_path {
        Some(p) => p.to_path_buf(),
        None => locator.find_default_browser().ok_or(WebDriverError::BrowserNotFound)?,
    };
    debug!("Reading browser version from {}", path.display());

    let unreadable = || WebDriverError::VersionUnreadable { path: path.clone() };
    let text = reader.read_version(&path).await.ok_or_else(unreadable)?;
    VersionNumber::parse(&text).map_err(|_| unreadable())
}

// --- Platform-Specific Implementations ---

#[cfg(target_os = "windows")]
fn find_chrome_path_system() -> Option<PathBuf> {
    ["ProgramFiles", "ProgramFiles(x86)", "LOCALAPPDATA"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|base| {
            Path::new(&base)
                .join("Google\\Chrome\\Application")
                .join("chrome.exe")
        })
        .find(|path| path.exists())
}

#[cfg(target_os = "macos")]
fn find_chrome_path_system() -> Option<PathBuf> {
    let path = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn find_chrome_path_system() -> Option<PathBuf> {
    [
        "google-chrome",
        "google-chrome-stable",
        "chromium-browser",
        "chromium",
    ]
    .into_iter()
    .find_map(|name| which::which(name).ok())
}

#[cfg(target_os = "windows")]
async fn read_file_version_windows(path: &Path) -> Option<String> {
    let command_str = format!(
        "(Get-Item '{}').VersionInfo.ProductVersion",
        path.to_string_lossy()
    );
    let output = Command::new("powershell")
        .args(["-NoProfile", "-Command", &command_str])
        .output()
        .await
        .map_err(|e| debug!("Failed to run '{}': {}", command_str, e))
        .ok()?;

    let version = String::from_utf8(output.stdout).ok()?;
    let version = version.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

async fn read_version_from_cli(path: &Path) -> Option<String> {
    let output = Command::new(path)
        .arg("--version")
        .output()
        .await
        .map_err(|e| debug!("Failed to run '{} --version': {}", path.display(), e))
        .ok()?;

    let stdout = String::from_utf8(output.stdout).ok()?;
    extract_version_token(&stdout)
}

/// Picks the first dotted numeric token, e.g. `114.0.5735.90` out of
/// `ChromeDriver 114.0.5735.90 (386bc09e8f4f2e025eddae123f36f6263096ae49-refs/branch-heads/5735@{#1052})`.
fn extract_version_token(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find(|s| s.chars().next().is_some_and(|c| c.is_ascii_digit()) && s.contains('.'))
        .map(|s| s.to_string())
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedLocator(Option<PathBuf>);

    impl BrowserLocator for FixedLocator {
        fn find_default_browser(&self) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    struct MapReader(HashMap<PathBuf, String>);

    #[async_trait]
    impl VersionReader for MapReader {
        async fn read_version(&self, path: &Path) -> Option<String> {
            self.0.get(path).cloned()
        }
    }

    fn reader(entries: &[(&str, &str)]) -> MapReader {
        MapReader(
            entries
                .iter()
                .map(|(p, v)| (PathBuf::from(p), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn extract_version_token_handles_chrome_and_driver_output() {
        assert_eq!(
            extract_version_token("Google Chrome 126.0.6478.126 \n").as_deref(),
            Some("126.0.6478.126")
        );
        assert_eq!(
            extract_version_token("ChromeDriver 114.0.5735.90 (386bc09e-refs/branch-heads/5735@{#1052})")
                .as_deref(),
            Some("114.0.5735.90")
        );
        assert_eq!(extract_version_token("Chromium unknown"), None);
    }

    #[tokio::test]
    async fn explicit_path_wins_over_the_locator() {
        let locator = FixedLocator(Some(PathBuf::from("/usr/bin/google-chrome")));
        let reader = reader(&[
            ("/usr/bin/google-chrome", "126.0.6478.126"),
            ("/opt/chrome/chrome", "115.0.5790.170"),
        ]);

        let version = detect_browser_version(Some(Path::new("/opt/chrome/chrome")), &locator, &reader)
            .await
            .unwrap();

        assert_eq!(version, VersionNumber::new(115, 0, 5790, 170));
    }

    #[tokio::test]
    async fn locator_supplies_the_default_path() {
        let locator = FixedLocator(Some(PathBuf::from("/usr/bin/google-chrome")));
        let reader = reader(&[("/usr/bin/google-chrome", "126.0.6478.126")]);

        let version = detect_browser_version(None, &locator, &reader).await.unwrap();

        assert_eq!(version, VersionNumber::new(126, 0, 6478, 126));
    }

    #[tokio::test]
    async fn missing_browser_is_reported() {
        let result = detect_browser_version(None, &FixedLocator(None), &reader(&[])).await;
        assert!(matches!(result, Err(WebDriverError::BrowserNotFound)));
    }

    #[tokio::test]
    async fn missing_or_garbled_version_is_unreadable() {
        let locator = FixedLocator(Some(PathBuf::from("/usr/bin/chromium")));

        let result = detect_browser_version(None, &locator, &reader(&[])).await;
        assert!(matches!(result, Err(WebDriverError::VersionUnreadable { .. })));

        let garbled = reader(&[("/usr/bin/chromium", "126.0.beta")]);
        let result = detect_browser_version(None, &locator, &garbled).await;
        assert!(matches!(result, Err(WebDriverError::VersionUnreadable { path }) if path == Path::new("/usr/bin/chromium")));
    }

    // Attempts to find your installed Chrome version.
    // Run with `cargo test -- --nocapture` to see the detected version.
    #[tokio::test]
    async fn test_get_chrome_version() {
        match detect_browser_version(None, &SystemBrowserLocator, &CommandVersionReader).await {
            Ok(version) => {
                println!("Successfully detected Chrome version: {}", version);
                assert!(version.major > 0);
            }
            Err(WebDriverError::BrowserNotFound) => {
                println!("Chrome not found, skipping test.");
            }
            Err(WebDriverError::VersionUnreadable { path }) => {
                println!("Chrome at {} reported no version, skipping test.", path.display());
            }
            Err(e) => {
                panic!("An unexpected error occurred: {:?}", e);
            }
        }
    }
}
