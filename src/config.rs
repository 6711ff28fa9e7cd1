//! Configuration types for craft-dl
//!
//! The embedding application owns loading and parsing its configuration file;
//! this module only defines the structured value it deserializes into, plus the
//! translation into a [`DesiredState`] for one provisioning run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::{DesiredState, Flavor, VersionSpec};

/// Top-level configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Server provisioning and launch settings
    pub server: ServerConfig,

    /// Root directory for ephemeral build workspaces (default: the system temp dir)
    ///
    /// Each build-from-source attempt creates and removes its own subdirectory
    /// underneath this root.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
}

/// Server settings (flavor, version, directory, launch arguments)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server flavor name ("paper", "purpur", or "spigot")
    pub flavor: String,

    /// Version to install; omit for the latest catalog version
    #[serde(default)]
    pub version: Option<String>,

    /// Path to a local server jar; set to bypass the catalog entirely
    #[serde(default)]
    pub jar_path: Option<PathBuf>,

    /// Installation directory (default: "./server")
    #[serde(default = "default_server_dir")]
    pub dir: PathBuf,

    /// Java runtime settings
    #[serde(default)]
    pub java: JavaConfig,

    /// Arguments passed to the server jar (default: ["nogui"])
    #[serde(default = "default_server_args")]
    pub args: Vec<String>,

    /// Whether the Minecraft EULA has been accepted
    ///
    /// Must be set to true before a server can be launched.
    #[serde(default)]
    pub eula: bool,

    /// Add-on payload URLs downloaded into the plugins directory
    #[serde(default)]
    pub plugins: Vec<String>,
}

/// Java runtime settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JavaConfig {
    /// Path to the java executable (searched on PATH if unset)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// JVM arguments (default: ["-Xmx2G", "-Xms2G"])
    #[serde(default = "default_java_args")]
    pub args: Vec<String>,
}

impl Default for JavaConfig {
    fn default() -> Self {
        Self {
            path: None,
            args: default_java_args(),
        }
    }
}

impl Config {
    /// Translate this configuration into the desired state for one run
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the flavor name is not in the
    /// supported set.
    pub fn desired_state(&self, force: bool) -> Result<DesiredState> {
        let flavor: Flavor = self.server.flavor.parse()?;

        let version_spec = if let Some(jar_path) = &self.server.jar_path {
            VersionSpec::LocalFile(jar_path.clone())
        } else {
            match self.server.version.as_deref() {
                None | Some("latest") => VersionSpec::Latest,
                Some(version) => VersionSpec::Exact(version.to_string()),
            }
        };

        Ok(DesiredState {
            flavor,
            version_spec,
            directory: self.server.dir.clone(),
            force,
        })
    }

    /// Resolve the java executable to use for builds and launches
    ///
    /// Uses the configured path if set, otherwise searches PATH.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no java executable can be found.
    pub fn resolve_java(&self) -> Result<PathBuf> {
        if let Some(path) = &self.server.java.path {
            return Ok(path.clone());
        }
        which::which("java")
            .map_err(|_| Error::config("java executable not found on PATH; set server.java.path"))
    }
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir()
}

fn default_server_dir() -> PathBuf {
    PathBuf::from("server")
}

fn default_server_args() -> Vec<String> {
    vec!["nogui".to_string()]
}

fn default_java_args() -> Vec<String> {
    vec!["-Xmx2G".to_string(), "-Xms2G".to_string()]
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config(flavor: &str) -> Config {
        serde_json::from_str(&format!(r#"{{"server": {{"flavor": "{flavor}"}}}}"#)).unwrap()
    }

    #[test]
    fn defaults_are_applied() {
        let config = minimal_config("paper");
        assert_eq!(config.server.dir, PathBuf::from("server"));
        assert_eq!(config.server.args, vec!["nogui"]);
        assert_eq!(config.server.java.args, vec!["-Xmx2G", "-Xms2G"]);
        assert!(!config.server.eula);
        assert!(config.server.plugins.is_empty());
    }

    #[test]
    fn desired_state_defaults_to_latest() {
        let config = minimal_config("purpur");
        let desired = config.desired_state(false).unwrap();
        assert_eq!(desired.flavor, Flavor::Purpur);
        assert_eq!(desired.version_spec, VersionSpec::Latest);
        assert!(!desired.force);
    }

    #[test]
    fn explicit_latest_keyword_resolves_to_latest() {
        let mut config = minimal_config("paper");
        config.server.version = Some("latest".to_string());
        let desired = config.desired_state(false).unwrap();
        assert_eq!(desired.version_spec, VersionSpec::Latest);
    }

    #[test]
    fn jar_path_wins_over_version() {
        let mut config = minimal_config("spigot");
        config.server.version = Some("1.21.4".to_string());
        config.server.jar_path = Some(PathBuf::from("custom.jar"));
        let desired = config.desired_state(true).unwrap();
        assert_eq!(
            desired.version_spec,
            VersionSpec::LocalFile(PathBuf::from("custom.jar"))
        );
        assert!(desired.force);
    }

    #[test]
    fn invalid_flavor_is_a_config_error() {
        let config = minimal_config("vanilla-modded");
        let err = config.desired_state(false).unwrap_err();
        assert!(err.to_string().contains("unknown flavor"));
    }
}
