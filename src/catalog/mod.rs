//! Version catalogs and artifact acquisition
//!
//! Every supported flavor implements the [`Repository`] trait: list the known
//! versions, resolve "latest", and acquire a runnable artifact for a version.
//! The three implementations are:
//!
//! - [`PaperRepository`]: JSON manifest plus a secondary per-version builds
//!   manifest; artifacts are direct downloads.
//! - [`PurpurRepository`]: JSON manifest with a declared "current" version;
//!   artifacts are direct downloads.
//! - [`SpigotRepository`]: HTML version index; artifacts are built from source
//!   by driving the external BuildTools builder in an ephemeral workspace.
//!
//! Selection happens through the closed [`Flavor`] enum via [`repository_for`].

mod paper;
mod purpur;
mod spigot;
pub mod version;

pub use paper::PaperRepository;
pub use purpur::PurpurRepository;
pub use spigot::SpigotRepository;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, Result};
use crate::types::Flavor;

/// Settings for the build-from-source acquirer
///
/// Threaded through explicitly so tests can point the builder at a scratch
/// workspace root and a fake java executable.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Java executable used to run the builder
    pub java: PathBuf,
    /// Root directory under which ephemeral build workspaces are created
    pub workspace_root: PathBuf,
}

impl Default for BuildSettings {
    /// Java from PATH and workspaces under the system temp dir
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            workspace_root: std::env::temp_dir(),
        }
    }
}

/// Capability set implemented by every flavor: version listing, latest
/// resolution, and artifact acquisition
///
/// # Examples
///
/// ```no_run
/// use craft_dl::catalog::{PaperRepository, Repository};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = PaperRepository::new();
/// let latest = repo.latest_version().await?;
/// repo.acquire(&latest, Path::new("./server/server.jar")).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Repository: Send + Sync {
    /// List the known version identifiers, in catalog order
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`](crate::error::CatalogError) on network or
    /// parse failure. Callers must not guess a version on failure.
    async fn list_versions(&self) -> Result<Vec<String>>;

    /// Resolve the newest version identifier
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`](crate::error::CatalogError) on network or
    /// parse failure, or when the catalog lists no versions.
    async fn latest_version(&self) -> Result<String>;

    /// Make the artifact for `version` exist at `dest`
    ///
    /// # Errors
    ///
    /// Returns an [`AcquisitionError`](crate::error::AcquisitionError) for
    /// download failures, or a build error for the build-from-source flavor.
    async fn acquire(&self, version: &str, dest: &Path) -> Result<()>;
}

/// Select the repository implementation for a flavor
#[must_use]
pub fn repository_for(flavor: Flavor, build: &BuildSettings) -> Box<dyn Repository> {
    match flavor {
        Flavor::Paper => Box::new(PaperRepository::new()),
        Flavor::Purpur => Box::new(PurpurRepository::new()),
        Flavor::Spigot => Box::new(SpigotRepository::new(build.clone())),
    }
}

/// Fetch a JSON catalog document
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> std::result::Result<T, CatalogError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::BadResponse {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| CatalogError::Parse(e.to_string()))
}

/// Fetch a text catalog document (the spigot HTML index)
pub(crate) async fn get_text(
    client: &reqwest::Client,
    url: &str,
) -> std::result::Result<String, CatalogError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::BadResponse {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}
