//! PaperMC repository
//!
//! Paper exposes a JSON project manifest listing versions, and a secondary
//! per-version manifest listing build numbers. The newest build for a version
//! determines the final download URL.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::{Repository, get_json};
use crate::error::{CatalogError, Result};
use crate::fetch::download_to_file;

const DEFAULT_BASE_URL: &str = "https://api.papermc.io/v2/projects/paper";

/// Version catalog and artifact acquirer for Paper
pub struct PaperRepository {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ProjectManifest {
    versions: Vec<String>,
}

#[derive(Deserialize)]
struct BuildsManifest {
    builds: Vec<BuildEntry>,
}

#[derive(Deserialize)]
struct BuildEntry {
    build: u64,
}

impl PaperRepository {
    /// Create a repository against the public Paper API
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a repository against a custom base URL (used by tests)
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn project(&self) -> std::result::Result<ProjectManifest, CatalogError> {
        get_json(&self.http, &self.base_url).await
    }

    /// Newest build number for a version
    async fn latest_build(&self, version: &str) -> std::result::Result<u64, CatalogError> {
        let url = format!("{}/versions/{}/builds", self.base_url, version);
        let manifest: BuildsManifest = get_json(&self.http, &url).await?;
        manifest
            .builds
            .iter()
            .map(|entry| entry.build)
            .max()
            .ok_or(CatalogError::Empty)
    }
}

impl Default for PaperRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for PaperRepository {
    async fn list_versions(&self) -> Result<Vec<String>> {
        Ok(self.project().await?.versions)
    }

    async fn latest_version(&self) -> Result<String> {
        // The manifest appends newer releases, so the last entry is current
        let manifest = self.project().await?;
        manifest
            .versions
            .into_iter()
            .next_back()
            .ok_or_else(|| CatalogError::Empty.into())
    }

    async fn acquire(&self, version: &str, dest: &Path) -> Result<()> {
        let build = self.latest_build(version).await?;
        let file_name = format!("paper-{version}-{build}.jar");
        let url = format!(
            "{}/versions/{}/builds/{}/downloads/{}",
            self.base_url, version, build, file_name
        );

        info!(version, build, "downloading paper server");
        download_to_file(&self.http, &url, dest).await?;
        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_project(server: &MockServer, versions: &[&str]) {
        Mock::given(method("GET"))
            .and(path("/paper"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "versions": versions,
            })))
            .mount(server)
            .await;
    }

    fn repo(server: &MockServer) -> PaperRepository {
        PaperRepository::with_base_url(format!("{}/paper", server.uri()))
    }

    #[tokio::test]
    async fn lists_versions_in_catalog_order() {
        let server = MockServer::start().await;
        mock_project(&server, &["1.20.6", "1.21", "1.21.4"]).await;

        let versions = repo(&server).list_versions().await.unwrap();
        assert_eq!(versions, vec!["1.20.6", "1.21", "1.21.4"]);
    }

    #[tokio::test]
    async fn latest_is_the_last_manifest_entry() {
        let server = MockServer::start().await;
        mock_project(&server, &["1.20.6", "1.21", "1.21.4"]).await;

        let latest = repo(&server).latest_version().await.unwrap();
        assert_eq!(latest, "1.21.4");
    }

    #[tokio::test]
    async fn empty_manifest_is_a_catalog_error() {
        let server = MockServer::start().await;
        mock_project(&server, &[]).await;

        let err = repo(&server).latest_version().await.unwrap_err();
        assert!(err.to_string().contains("no versions"));
    }

    #[tokio::test]
    async fn acquire_resolves_newest_build_then_downloads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/versions/1.21.4/builds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "builds": [{"build": 12}, {"build": 131}, {"build": 57}],
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/paper/versions/1.21.4/builds/131/downloads/paper-1.21.4-131.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"paper-jar".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("server.jar");
        repo(&server).acquire("1.21.4", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"paper-jar");
    }

    #[tokio::test]
    async fn acquire_fails_when_no_builds_exist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/versions/1.21.4/builds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"builds": []})))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let err = repo(&server)
            .acquire("1.21.4", &temp.path().join("server.jar"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no versions"));
    }

    #[tokio::test]
    async fn catalog_failure_propagates_without_guessing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = repo(&server).latest_version().await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }
}
