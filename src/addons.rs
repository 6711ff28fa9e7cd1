//! Add-on payload provisioning
//!
//! Server add-ons (plugins) live in a `plugins/` subdirectory of the
//! installation. After a successful reconcile, each configured payload URL is
//! streamed into that directory under a name derived from the URL.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::fetch::{download_to_file, file_name_from_url};
use crate::types::PLUGINS_DIR;

/// Ensure the plugins directory exists and download the configured payloads
///
/// Already-present payload files are re-downloaded; add-ons carry no version
/// record of their own.
///
/// # Errors
///
/// Returns a filesystem error when the plugins directory cannot be created,
/// or an acquisition error when a payload download fails.
pub async fn provision_addons(directory: &Path, urls: &[String]) -> Result<Vec<PathBuf>> {
    let plugins_dir = directory.join(PLUGINS_DIR);
    tokio::fs::create_dir_all(&plugins_dir)
        .await
        .map_err(|e| Error::filesystem(&plugins_dir, e))?;

    let client = reqwest::Client::new();
    let mut installed = Vec::with_capacity(urls.len());

    for url in urls {
        let dest = plugins_dir.join(file_name_from_url(url));
        info!(url, dest = %dest.display(), "downloading add-on payload");
        download_to_file(&client, url, &dest).await?;
        installed.push(dest);
    }

    Ok(installed)
}
