//! # craft-dl
//!
//! Backend library for provisioning and running Minecraft-compatible servers.
//!
//! ## Design Philosophy
//!
//! craft-dl is designed to be:
//! - **Declarative** - Describe the desired installation; the reconciler
//!   decides whether anything needs to be downloaded or built
//! - **Safe by default** - Never overwrites a non-empty directory unless forced
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Flavor-agnostic** - Paper, Purpur, and Spigot behind one interface
//!
//! ## Quick Start
//!
//! ```no_run
//! use craft_dl::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config: Config = serde_json::from_str(
//!         r#"{"server": {"flavor": "paper", "eula": true}}"#,
//!     )?;
//!
//!     // Provision ./server (downloading the latest Paper release if needed)
//!     // and start it with inherited console I/O.
//!     let mut instance = craft_dl::run(&config, false).await?;
//!     let status = instance.wait().await?;
//!     println!("server exited: {status}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Add-on payload provisioning
pub mod addons;
/// Version catalogs and artifact acquisition
pub mod catalog;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Streaming download helpers
mod fetch;
/// Server process launching and supervision
pub mod launch;
/// Provisioning reconciler
pub mod provision;
/// Persisted installation status
pub mod status;
/// Core types
pub mod types;

// Re-export commonly used types
pub use catalog::{BuildSettings, Repository, repository_for};
pub use config::{Config, JavaConfig, ServerConfig};
pub use error::{AcquisitionError, CatalogError, Error, Result, StatusError};
pub use launch::{Launcher, RunningInstance};
pub use provision::{Provisioned, provision, provision_with};
pub use types::{DesiredState, Flavor, InstalledStatus, VersionSpec};

use types::EULA_FILE;

/// Provision, prepare, and launch a server in one call
///
/// Runs the reconciler for the configured desired state, provisions add-on
/// payloads, checks the EULA gate, and launches the server. The EULA check
/// happens before the launcher is invoked: a configuration that has not
/// accepted the EULA terminates the run with a configuration error.
///
/// # Errors
///
/// Returns any of the fatal provisioning errors, or a configuration error when
/// the flavor is unknown, java cannot be found, or the EULA is not accepted.
pub async fn run(config: &Config, force: bool) -> Result<RunningInstance> {
    let desired = config.desired_state(force)?;
    let java = config.resolve_java()?;

    let build = BuildSettings {
        java: java.clone(),
        workspace_root: config.workspace_root.clone(),
    };
    let provisioned = provision::provision(&desired, &build).await?;

    addons::provision_addons(&provisioned.directory, &config.server.plugins).await?;

    if !config.server.eula {
        return Err(Error::config(
            "you must accept the EULA (https://aka.ms/MinecraftEULA) before you can run a server; \
             set server.eula to true in your configuration",
        ));
    }
    let eula_path = provisioned.directory.join(EULA_FILE);
    tokio::fs::write(&eula_path, "eula=true")
        .await
        .map_err(|e| Error::filesystem(eula_path, e))?;

    let launcher = Launcher::new(
        java,
        config.server.java.args.clone(),
        config.server.args.clone(),
    );
    launcher.launch(&provisioned.directory)
}

/// List the known versions for a flavor
///
/// Convenience for embedders exposing a "versions" command.
///
/// # Errors
///
/// Returns a catalog error on network or parse failure.
pub async fn versions(flavor: Flavor) -> Result<Vec<String>> {
    repository_for(flavor, &BuildSettings::default())
        .list_versions()
        .await
}

/// Resolve the latest version for a flavor
///
/// # Errors
///
/// Returns a catalog error on network or parse failure.
pub async fn latest(flavor: Flavor) -> Result<String> {
    repository_for(flavor, &BuildSettings::default())
        .latest_version()
        .await
}
