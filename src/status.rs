//! Persisted installation status
//!
//! The status record lives at a well-known name (`version.json`) at the root of
//! the installation directory and is the single source of truth for what is
//! installed there. A missing record means "never provisioned" and is not an
//! error; a record that exists but cannot be parsed is fatal and never
//! auto-repaired.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, StatusError};
use crate::types::{InstalledStatus, STATUS_FILE};

/// Path of the status record inside an installation directory
#[must_use]
pub fn status_path(directory: &Path) -> PathBuf {
    directory.join(STATUS_FILE)
}

/// Read the status record of an installation directory
///
/// # Errors
///
/// Returns a [`StatusError`] when the record exists but is not a regular file,
/// cannot be read, or cannot be parsed. An absent record is `Ok(None)`.
pub async fn read(directory: &Path) -> Result<Option<InstalledStatus>> {
    let path = status_path(directory);

    let metadata = match tokio::fs::symlink_metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StatusError::Unreadable { path, source: e }.into());
        }
    };

    if !metadata.is_file() {
        return Err(StatusError::NotAFile { path }.into());
    }

    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| StatusError::Unreadable {
            path: path.clone(),
            source: e,
        })?;

    let status = serde_json::from_str(&text).map_err(|e| StatusError::Corrupt {
        path,
        source: e,
    })?;

    Ok(Some(status))
}

/// Write the status record of an installation directory
///
/// The record is written to a temporary sibling first and renamed into place,
/// so a reader never observes a torn record.
///
/// # Errors
///
/// Returns a filesystem error when the record cannot be written.
pub async fn write(directory: &Path, status: &InstalledStatus) -> Result<()> {
    let path = status_path(directory);
    let payload = serde_json::to_string(status).map_err(|e| StatusError::Corrupt {
        path: path.clone(),
        source: e,
    })?;

    let tmp = directory.join(".version.json.tmp");
    tokio::fs::write(&tmp, payload)
        .await
        .map_err(|e| Error::filesystem(&tmp, e))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|e| Error::filesystem(&path, e))?;

    Ok(())
}
