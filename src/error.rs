use thiserror::Error;
use std::path::PathBuf;

/// Error type for all possible failures in the library.
#[derive(Error, Debug)]
pub enum WebDriverError {
    #[error("Invalid version '{input}': expected 1 to 4 dot-separated non-negative integers")]
    InvalidVersionFormat {
        input: String,
    },

    #[error("Browser not found. Please specify the path manually or ensure it's in a standard location.")]
    BrowserNotFound,

    #[error("Could not read a version from '{path}'")]
    VersionUnreadable {
        path: PathBuf,
    },

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Failed to parse JSON response from '{url}': {source}")]
    JsonParseError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error accessing path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read zip archive '{path}': {source}")]
    ZipError {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive '{archive}' has no entry named '{entry}'")]
    EntryNotFound {
        archive: PathBuf,
        entry: String,
    },

    #[error("Operation cancelled")]
    Cancelled,
}
