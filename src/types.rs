//! Core types for craft-dl

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// File name of the server artifact inside the installation directory
pub const SERVER_FILE: &str = "server.jar";

/// File name of the persisted status record inside the installation directory
pub const STATUS_FILE: &str = "version.json";

/// Subdirectory for add-on payloads (plugins) inside the installation directory
pub const PLUGINS_DIR: &str = "plugins";

/// File name of the EULA acceptance marker inside the installation directory
pub const EULA_FILE: &str = "eula.txt";

/// The closed set of supported server flavors
///
/// Each flavor knows how to list its versions, resolve "latest", and acquire a
/// runnable artifact. Selection happens through this enumeration, not through
/// open-ended registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// PaperMC; structured manifest with a secondary per-version builds manifest
    Paper,
    /// Purpur; structured manifest with a declared "current" version
    Purpur,
    /// Spigot; HTML version index, built from source via BuildTools
    Spigot,
}

impl Flavor {
    /// All supported flavors, in display order
    pub const ALL: [Flavor; 3] = [Flavor::Paper, Flavor::Purpur, Flavor::Spigot];

    /// The flavor's canonical lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Paper => "paper",
            Flavor::Purpur => "purpur",
            Flavor::Spigot => "spigot",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavor {
    type Err = Error;

    /// Parse a flavor name, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns a configuration error listing the valid flavors when the name
    /// is not in the supported set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paper" => Ok(Flavor::Paper),
            "purpur" => Ok(Flavor::Purpur),
            "spigot" => Ok(Flavor::Spigot),
            other => {
                let valid = Flavor::ALL
                    .iter()
                    .map(Flavor::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(Error::config(format!(
                    "unknown flavor: {other} (valid flavors: {valid})"
                )))
            }
        }
    }
}

/// What the caller wants installed: an explicit version, the newest one, or a
/// jar they already have on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VersionSpec {
    /// Resolve the newest version from the flavor's catalog
    #[default]
    Latest,
    /// Use this exact version; validated against the catalog's version list
    Exact(String),
    /// Use a local jar file; bypasses the catalog entirely
    LocalFile(PathBuf),
}

/// Immutable input to one provisioning run
#[derive(Debug, Clone)]
pub struct DesiredState {
    /// Which server flavor to install
    pub flavor: Flavor,
    /// Which version (or local file) to install
    pub version_spec: VersionSpec,
    /// Target installation directory
    pub directory: PathBuf,
    /// Allow re-acquisition into a non-empty directory
    pub force: bool,
}

/// The persisted record of what is installed in a directory
///
/// Stored as `version.json` at the installation-directory root. This record is
/// the single source of truth for "what is currently installed here"; it is
/// overwritten on every successful provisioning run. Exactly these three
/// fields; any structural change is a breaking format change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledStatus {
    /// Flavor identifier
    pub flavor: Flavor,
    /// Version identifier; a filesystem path string when `local` is set
    pub version: String,
    /// Whether the artifact came from a local file rather than a catalog
    pub local: bool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flavor_parses_case_insensitively() {
        assert_eq!("paper".parse::<Flavor>().unwrap(), Flavor::Paper);
        assert_eq!("Purpur".parse::<Flavor>().unwrap(), Flavor::Purpur);
        assert_eq!("SPIGOT".parse::<Flavor>().unwrap(), Flavor::Spigot);
    }

    #[test]
    fn unknown_flavor_lists_valid_flavors() {
        let err = "forge".parse::<Flavor>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("forge"));
        assert!(message.contains("paper, purpur, spigot"));
    }

    #[test]
    fn status_round_trips_through_json() {
        let status = InstalledStatus {
            flavor: Flavor::Paper,
            version: "1.21.4".to_string(),
            local: false,
        };
        let text = serde_json::to_string(&status).unwrap();
        let parsed: InstalledStatus = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn status_serializes_flavor_lowercase() {
        let status = InstalledStatus {
            flavor: Flavor::Spigot,
            version: "1.20.6".to_string(),
            local: false,
        };
        let text = serde_json::to_string(&status).unwrap();
        assert!(text.contains("\"spigot\""));
    }
}
