//! Spigot repository
//!
//! Spigot publishes no build artifacts; its version catalog is an HTML index
//! whose anchors encode version identifiers, and artifacts are produced by the
//! external BuildTools builder. Each acquisition runs BuildTools in a fresh
//! ephemeral workspace that is removed again on every exit path.

use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{info, warn};

use super::{BuildSettings, Repository, get_text, version};
use crate::error::{AcquisitionError, CatalogError, Error, Result};
use crate::fetch::download_to_file;

const DEFAULT_VERSIONS_URL: &str = "https://hub.spigotmc.org/versions";
const DEFAULT_BUILD_TOOLS_URL: &str = "https://hub.spigotmc.org/jenkins/job/BuildTools/lastSuccessfulBuild/artifact/target/BuildTools.jar";

/// File name the builder tool is saved under inside the workspace
const BUILD_TOOLS_FILE: &str = "BuildTools.jar";

/// Version catalog and build-from-source acquirer for Spigot
pub struct SpigotRepository {
    http: reqwest::Client,
    versions_url: String,
    build_tools_url: String,
    build: BuildSettings,
}

impl SpigotRepository {
    /// Create a repository against the public Spigot hub
    #[must_use]
    pub fn new(build: BuildSettings) -> Self {
        Self::with_endpoints(DEFAULT_VERSIONS_URL, DEFAULT_BUILD_TOOLS_URL, build)
    }

    /// Create a repository against custom endpoints (used by tests)
    #[must_use]
    pub fn with_endpoints(
        versions_url: impl Into<String>,
        build_tools_url: impl Into<String>,
        build: BuildSettings,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            versions_url: versions_url.into(),
            build_tools_url: build_tools_url.into(),
            build,
        }
    }

    /// Fetch the builder tool and run it for `version`, leaving the artifact at `dest`
    ///
    /// Runs entirely inside `workspace`; the caller owns workspace removal.
    async fn build_in(&self, workspace: &Path, target_version: &str, dest: &Path) -> Result<()> {
        let tool_path = workspace.join(BUILD_TOOLS_FILE);
        info!(url = %self.build_tools_url, "downloading builder tool");
        download_to_file(&self.http, &self.build_tools_url, &tool_path).await?;

        info!(version = target_version, "running builder");
        let status = Command::new(&self.build.java)
            .arg("-jar")
            .arg(&tool_path)
            .arg("--rev")
            .arg(target_version)
            .current_dir(workspace)
            .status()
            .await
            .map_err(|e| Error::filesystem(&self.build.java, e))?;

        if !status.success() {
            // Signal-terminated builders report no code; map that to -1
            return Err(Error::Build {
                code: status.code().unwrap_or(-1),
            });
        }

        // The builder emits its artifact under a conventional name
        let output = workspace.join(format!("spigot-{target_version}.jar"));
        if !output.is_file() {
            return Err(AcquisitionError::MissingOutput { path: output }.into());
        }

        tokio::fs::copy(&output, dest)
            .await
            .map_err(|e| AcquisitionError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }
}

#[async_trait]
impl Repository for SpigotRepository {
    async fn list_versions(&self) -> Result<Vec<String>> {
        let html = get_text(&self.http, &self.versions_url).await?;

        // Anchors look like <a href="1.21.4.json">; capture the identifier
        let anchor = Regex::new(r#"<a href="([0-9][0-9.]*)\.json">"#)
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let versions = anchor
            .captures_iter(&html)
            .map(|capture| capture[1].to_string())
            .collect::<Vec<_>>();

        if versions.is_empty() {
            return Err(CatalogError::Parse("no version anchors in index".to_string()).into());
        }

        Ok(versions)
    }

    async fn latest_version(&self) -> Result<String> {
        // The index exposes no ordering of its own; fall back to numeric order
        let versions = self.list_versions().await?;
        version::latest(&versions)
            .map(str::to_string)
            .ok_or_else(|| CatalogError::Empty.into())
    }

    async fn acquire(&self, target_version: &str, dest: &Path) -> Result<()> {
        tokio::fs::create_dir_all(&self.build.workspace_root)
            .await
            .map_err(|e| Error::filesystem(&self.build.workspace_root, e))?;

        let workspace = TempDir::with_prefix_in("buildtools-", &self.build.workspace_root)
            .map_err(|e| Error::filesystem(&self.build.workspace_root, e))?;

        let result = self.build_in(workspace.path(), target_version, dest).await;

        // Workspace removal runs on every path: build failure, fetch failure,
        // and success alike.
        if let Err(e) = workspace.close() {
            warn!(error = %e, "failed to remove build workspace");
        }

        result
    }
}
