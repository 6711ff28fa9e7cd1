//! Purpur repository
//!
//! Purpur exposes a single JSON manifest with the full version list and a
//! `metadata.current` marker naming the latest release. Downloads go through
//! the API's per-version "latest build" endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::{Repository, get_json};
use crate::error::{CatalogError, Result};
use crate::fetch::download_to_file;

const DEFAULT_BASE_URL: &str = "https://api.purpurmc.org/v2/purpur";

/// Version catalog and artifact acquirer for Purpur
pub struct PurpurRepository {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ProjectManifest {
    metadata: Metadata,
    versions: Vec<String>,
}

#[derive(Deserialize)]
struct Metadata {
    current: String,
}

impl PurpurRepository {
    /// Create a repository against the public Purpur API
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
}

impl Default for PurpurRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for PurpurRepository {
    async fn list_versions(&self) -> Result<Vec<String>> {
        Ok(self.project().await?.versions)
    }

    async fn latest_version(&self) -> Result<String> {
        // The catalog declares its own current version; trust it
        Ok(self.project().await?.metadata.current)
    }

    async fn acquire(&self, version: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/{}/latest/download", self.base_url, version);
        info!(version, "downloading purpur server");
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

    fn repo(server: &MockServer) -> PurpurRepository {
        PurpurRepository::with_base_url(format!("{}/purpur", server.uri()))
    }

    #[tokio::test]
    async fn latest_uses_the_declared_current_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/purpur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                // current deliberately not the last list entry
                "metadata": {"current": "1.21.1"},
                "versions": ["1.20.6", "1.21.1", "1.21.4-rc1"],
            })))
            .mount(&server)
            .await;

        let repo = repo(&server);
        assert_eq!(repo.latest_version().await.unwrap(), "1.21.1");
        assert_eq!(
            repo.list_versions().await.unwrap(),
            vec!["1.20.6", "1.21.1", "1.21.4-rc1"]
        );
    }

    #[tokio::test]
    async fn acquire_streams_the_latest_build_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/purpur/1.21.1/latest/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"purpur-jar".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("server.jar");
        repo(&server).acquire("1.21.1", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"purpur-jar");
    }

    #[tokio::test]
    async fn malformed_manifest_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/purpur"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = repo(&server).latest_version().await.unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
