//! End-to-end provisioning flow against a mock catalog
//!
//! Exercises the real Paper repository, reconciler, and status store together:
//! resolve "latest", download the artifact, persist status, and stay idempotent
//! on a second run.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use craft_dl::{DesiredState, Flavor, InstalledStatus, VersionSpec, provision_with};
use craft_dl::catalog::PaperRepository;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/paper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "versions": ["1.0", "2.0"],
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/paper/versions/2.0/builds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "builds": [{"build": 5}],
        })))
        .mount(server)
        .await;
    // The artifact download must happen exactly once across both runs
    Mock::given(method("GET"))
        .and(path("/paper/versions/2.0/builds/5/downloads/paper-2.0-5.jar"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"server-bytes".to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn latest_on_empty_directory_downloads_and_persists_status() {
    let server = MockServer::start().await;
    mock_catalog(&server).await;

    let temp = TempDir::new().unwrap();
    let directory = temp.path().join("srv");
    let repository = PaperRepository::with_base_url(format!("{}/paper", server.uri()));

    let desired = DesiredState {
        flavor: Flavor::Paper,
        version_spec: VersionSpec::Latest,
        directory: directory.clone(),
        force: false,
    };

    // First run: resolve "latest" -> 2.0, download, persist status
    let outcome = provision_with(&desired, &repository).await.unwrap();
    assert!(outcome.acquired);
    assert_eq!(outcome.server_jar, directory.join("server.jar"));
    assert_eq!(std::fs::read(&outcome.server_jar).unwrap(), b"server-bytes");
    assert_eq!(
        outcome.status,
        InstalledStatus {
            flavor: Flavor::Paper,
            version: "2.0".to_string(),
            local: false,
        }
    );

    let status_text = std::fs::read(directory.join("version.json")).unwrap();

    // Second run: status matches and the artifact exists, so nothing is
    // downloaded and both files stay byte-identical.
    let outcome = provision_with(&desired, &repository).await.unwrap();
    assert!(!outcome.acquired);
    assert_eq!(std::fs::read(&outcome.server_jar).unwrap(), b"server-bytes");
    assert_eq!(
        std::fs::read(directory.join("version.json")).unwrap(),
        status_text
    );

    // MockServer verifies the .expect(1) on the download on drop
}

#[tokio::test]
async fn explicit_version_is_validated_against_the_catalog() {
    let server = MockServer::start().await;
    mock_catalog(&server).await;

    let temp = TempDir::new().unwrap();
    let repository = PaperRepository::with_base_url(format!("{}/paper", server.uri()));

    let desired = DesiredState {
        flavor: Flavor::Paper,
        version_spec: VersionSpec::Exact("9.9".to_string()),
        directory: temp.path().join("srv"),
        force: false,
    };

    let err = provision_with(&desired, &repository).await.unwrap_err();
    assert!(err.to_string().contains("unknown version 9.9"));
}

#[cfg(unix)]
mod launch_flow {
    use super::*;
    use craft_dl::Launcher;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    #[tokio::test]
    async fn provisioned_server_launches_and_exits() {
        let server = MockServer::start().await;
        mock_catalog(&server).await;

        let temp = TempDir::new().unwrap();
        let directory = temp.path().join("srv");
        let repository = PaperRepository::with_base_url(format!("{}/paper", server.uri()));

        let desired = DesiredState {
            flavor: Flavor::Paper,
            version_spec: VersionSpec::Latest,
            directory: directory.clone(),
            force: false,
        };
        provision_with(&desired, &repository).await.unwrap();

        // A shell script stands in for java
        let java = temp.path().join("fake-java.sh");
        std::fs::write(&java, "#!/bin/sh\nexit 0\n").unwrap();
        let mut perms = std::fs::metadata(&java).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&java, perms).unwrap();

        let launcher = Launcher::new(
            PathBuf::from(&java),
            vec!["-Xmx2G".into(), "-Xms2G".into()],
            vec!["nogui".into()],
        );
        let mut instance = launcher.launch(&directory).unwrap();
        let status = instance.wait().await.unwrap();
        assert!(status.success());
    }
}
