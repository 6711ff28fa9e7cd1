//! Provisioning reconciler
//!
//! Decides, for one [`DesiredState`] and whatever already occupies the target
//! directory, whether to reuse the existing installation, re-acquire the
//! artifact, or refuse to touch the directory. The decision procedure:
//!
//! 1. resolve the artifact source (local jar or catalog version);
//! 2. resolve the installation directory, creating it if absent;
//! 3. read the prior status record and compare it field-by-field against the
//!    resolved desired triple; any drift invalidates the installation;
//! 4. safety gate: an invalid, non-forced run refuses to touch a non-empty
//!    directory, because re-acquisition is destructive to its contents;
//! 5. acquire when the artifact file is missing or the status was invalid;
//! 6. persist the freshly resolved status unconditionally.
//!
//! On successful return the artifact file and the status record always agree;
//! when acquisition is skipped it is because that invariant was verified to
//! already hold. Nothing here retries, and nothing here exits the process.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::{BuildSettings, Repository, repository_for};
use crate::error::{AcquisitionError, CatalogError, Error, Result};
use crate::status;
use crate::types::{DesiredState, InstalledStatus, SERVER_FILE, VersionSpec};

/// Outcome of a successful provisioning run
#[derive(Debug, Clone)]
pub struct Provisioned {
    /// The resolved installation directory
    pub directory: PathBuf,
    /// Path of the server artifact inside the directory
    pub server_jar: PathBuf,
    /// The status record that was persisted
    pub status: InstalledStatus,
    /// Whether the artifact was (re-)acquired during this run
    pub acquired: bool,
}

/// How the artifact will be obtained
enum ArtifactSource {
    /// Copy a user-supplied local jar into place
    Local(PathBuf),
    /// Download or build this catalog version
    Catalog(String),
}

/// Provision an installation using the flavor's real repository
///
/// # Errors
///
/// Returns one of the fatal error kinds described on [`Error`]; none of them
/// are retried internally.
pub async fn provision(desired: &DesiredState, build: &BuildSettings) -> Result<Provisioned> {
    let repository = repository_for(desired.flavor, build);
    provision_with(desired, repository.as_ref()).await
}

/// Provision an installation using a caller-supplied repository
///
/// This is the full reconciler; [`provision`] merely selects the repository
/// for the desired flavor. Supplying the repository explicitly is useful for
/// embedding applications with custom acquisition backends, and for tests.
///
/// # Errors
///
/// See [`provision`].
pub async fn provision_with(
    desired: &DesiredState,
    repository: &dyn Repository,
) -> Result<Provisioned> {
    let source = resolve_source(desired, repository).await?;

    let resolved = InstalledStatus {
        flavor: desired.flavor,
        version: match &source {
            ArtifactSource::Local(path) => path.to_string_lossy().into_owned(),
            ArtifactSource::Catalog(version) => version.clone(),
        },
        local: matches!(source, ArtifactSource::Local(_)),
    };

    ensure_directory(&desired.directory).await?;

    let valid = match status::read(&desired.directory).await? {
        Some(prior) => report_drift(&prior, &resolved),
        None => {
            debug!(directory = %desired.directory.display(), "no prior status record");
            false
        }
    };

    // Re-acquisition overwrites whatever occupies the directory, so an
    // invalid, non-forced run must not proceed into a non-empty one.
    if !valid && !desired.force {
        refuse_if_occupied(&desired.directory).await?;
    }

    let server_jar = desired.directory.join(SERVER_FILE);
    let acquired = if !server_jar.is_file() || !valid {
        match &source {
            ArtifactSource::Local(path) => {
                info!(jar = %path.display(), "copying local server jar");
                tokio::fs::copy(path, &server_jar)
                    .await
                    .map_err(|e| AcquisitionError::Io {
                        path: server_jar.clone(),
                        source: e,
                    })?;
            }
            ArtifactSource::Catalog(version) => {
                info!(flavor = %desired.flavor, version, "acquiring server artifact");
                repository.acquire(version, &server_jar).await?;
            }
        }
        true
    } else {
        info!(
            flavor = %desired.flavor,
            version = %resolved.version,
            "existing installation is up to date"
        );
        false
    };

    status::write(&desired.directory, &resolved).await?;

    Ok(Provisioned {
        directory: desired.directory.clone(),
        server_jar,
        status: resolved,
        acquired,
    })
}

/// Resolve the version spec into a concrete artifact source
///
/// A local jar bypasses the catalog entirely; an explicit version is validated
/// against the catalog's version list.
async fn resolve_source(
    desired: &DesiredState,
    repository: &dyn Repository,
) -> Result<ArtifactSource> {
    match &desired.version_spec {
        VersionSpec::LocalFile(path) => {
            let resolved = tokio::fs::canonicalize(path).await.map_err(|_| {
                Error::config(format!("file not found: {}", path.display()))
            })?;
            let metadata = tokio::fs::metadata(&resolved)
                .await
                .map_err(|e| Error::filesystem(&resolved, e))?;
            if !metadata.is_file() {
                return Err(Error::config(format!("not a file: {}", resolved.display())));
            }
            Ok(ArtifactSource::Local(resolved))
        }
        VersionSpec::Latest => {
            let latest = repository.latest_version().await?;
            Ok(ArtifactSource::Catalog(latest))
        }
        VersionSpec::Exact(version) => {
            let known = repository.list_versions().await?;
            if !known.iter().any(|candidate| candidate == version) {
                return Err(CatalogError::UnknownVersion {
                    version: version.clone(),
                    known: known.join(", "),
                }
                .into());
            }
            Ok(ArtifactSource::Catalog(version.clone()))
        }
    }
}

/// Ensure the installation directory exists and is a directory
async fn ensure_directory(directory: &Path) -> Result<()> {
    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|e| Error::filesystem(directory, e))?;
    let metadata = tokio::fs::metadata(directory)
        .await
        .map_err(|e| Error::filesystem(directory, e))?;
    if !metadata.is_dir() {
        return Err(Error::filesystem(
            directory,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }
    Ok(())
}

/// Compare the prior record against the freshly resolved triple
///
/// Logs each changed field and returns whether the installation is still
/// valid. Any drift invalidates it and forces re-acquisition.
fn report_drift(prior: &InstalledStatus, resolved: &InstalledStatus) -> bool {
    if prior == resolved {
        return true;
    }

    if prior.flavor != resolved.flavor {
        warn!(from = %prior.flavor, to = %resolved.flavor, "flavor changed");
    }
    if prior.version != resolved.version || prior.local != resolved.local {
        warn!(from = %prior.version, to = %resolved.version, "version changed");
    }

    false
}

/// Refuse to proceed into a non-empty directory
async fn refuse_if_occupied(directory: &Path) -> Result<()> {
    let mut entries = tokio::fs::read_dir(directory)
        .await
        .map_err(|e| Error::filesystem(directory, e))?;
    let occupied = entries
        .next_entry()
        .await
        .map_err(|e| Error::filesystem(directory, e))?
        .is_some();

    if occupied {
        return Err(Error::ConfirmationRequired {
            path: directory.to_path_buf(),
        });
    }
    Ok(())
}
