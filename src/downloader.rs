//! Archive download and single-entry extraction.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::WebDriverError;

/// Creates a scratch directory that is deleted when the guard is dropped.
pub fn scratch_dir() -> Result<TempDir, WebDriverError> {
    tempfile::Builder::new()
        .prefix("chromedriver-manager-")
        .tempdir()
        .map_err(|e| WebDriverError::IoError {
            path: std::env::temp_dir(),
            source: e,
        })
}

/// Downloads a file from a given URL and saves it to a destination path.
pub async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest_path: &Path,
) -> Result<(), WebDriverError> {
    debug!("Downloading {} to {}", url, dest_path.display());

    let mut response = client.get(url).send().await?.error_for_status()?;

    let mut dest_file = File::create(dest_path).await.map_err(|e| WebDriverError::IoError {
        path: dest_path.to_path_buf(),
        source: e,
    })?;

    // Stream the body chunk by chunk.
    while let Some(chunk) = response.chunk().await? {
        dest_file.write_all(&chunk).await.map_err(|e| WebDriverError::IoError {
            path: dest_path.to_path_buf(),
            source: e,
        })?;
    }
    dest_file.flush().await.map_err(|e| WebDriverError::IoError {
        path: dest_path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Extracts the archive entry whose file name equals `entry_name`
/// (ignoring case and any leading folders) to `dest_path`, overwriting it.
///
/// The entry is first written to a temporary file next to `dest_path` and
/// then moved into place, so a failed extraction leaves the previous file
/// untouched. The zip logic is synchronous and runs on the blocking pool.
///
/// `cancel` is checked between copied chunks and right before the move. Once
/// it fires, the staged file is discarded and `dest_path` is left as it was.
/// The returned future must be awaited to completion to observe the result;
/// dropping it does not stop the blocking job.
pub async fn extract_named_entry(
    archive_path: &Path,
    entry_name: &str,
    dest_path: &Path,
    cancel: CancellationToken,
) -> Result<PathBuf, WebDriverError> {
    let archive_path = archive_path.to_path_buf();
    let entry_name = entry_name.to_string();
    let dest_path = dest_path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        extract_named_entry_blocking(&archive_path, &entry_name, &dest_path, &cancel)
    })
    .await
    .map_err(|e| WebDriverError::IoError {
        path: PathBuf::from("extract"),
        source: std::io::Error::other(e),
    })?
}

fn extract_named_entry_blocking(
    archive_path: &Path,
    entry_name: &str,
    dest_path: &Path,
    cancel: &CancellationToken,
) -> Result<PathBuf, WebDriverError> {
    let zip_err = |e| WebDriverError::ZipError {
        path: archive_path.to_path_buf(),
        source: e,
    };
    let io_err = |path: &Path, e| WebDriverError::IoError {
        path: path.to_path_buf(),
        source: e,
    };

    let file = std::fs::File::open(archive_path).map_err(|e| io_err(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(zip_err)?;

    let index = (0..archive.len())
        .find(|&i| {
            archive.by_index(i).is_ok_and(|entry| {
                !entry.is_dir() && entry_file_name(entry.name()).eq_ignore_ascii_case(entry_name)
            })
        })
        .ok_or_else(|| WebDriverError::EntryNotFound {
            archive: archive_path.to_path_buf(),
            entry: entry_name.to_string(),
        })?;
    let mut entry = archive.by_index(index).map_err(zip_err)?;

    let dest_dir = match dest_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dest_dir).map_err(|e| io_err(dest_dir, e))?;

    let mut staged = NamedTempFile::new_in(dest_dir).map_err(|e| io_err(dest_dir, e))?;
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        if cancel.is_cancelled() {
            return Err(WebDriverError::Cancelled);
        }
        let n = entry.read(&mut buf).map_err(|e| io_err(staged.path(), e))?;
        if n == 0 {
            break;
        }
        staged
            .as_file_mut()
            .write_all(&buf[..n])
            .map_err(|e| io_err(staged.path(), e))?;
    }
    staged.as_file_mut().flush().map_err(|e| io_err(staged.path(), e))?;

    // Set permissions for the executable on Unix-like systems.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = entry.unix_mode().map_or(0o755, |m| m | 0o111) & 0o7777;
        std::fs::set_permissions(staged.path(), std::fs::Permissions::from_mode(mode))
            .map_err(|e| io_err(staged.path(), e))?;
    }

    // Last point at which the destination is still untouched.
    if cancel.is_cancelled() {
        return Err(WebDriverError::Cancelled);
    }
    staged
        .persist(dest_path)
        .map_err(|e| io_err(dest_path, e.error))?;

    debug!("Extracted '{}' to {}", entry.name(), dest_path.display());
    Ok(dest_path.to_path_buf())
}

/// Last path component of a zip entry name; zip names always use '/'.
fn entry_file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
