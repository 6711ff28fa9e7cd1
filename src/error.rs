//! Error types for craft-dl
//!
//! This module provides comprehensive error handling for the library, including:
//! - Domain-specific error types (Catalog, Acquisition, Status, etc.)
//! - Context information (path, version, builder exit code)
//!
//! None of these errors are retried internally; all of them propagate to the
//! embedding application, which decides how to report them and whether to exit.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for craft-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for craft-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (invalid flavor, invalid version, missing required field)
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
    },

    /// Filesystem access failed; reports the path and the underlying cause
    #[error("filesystem error at {path}: {source}")]
    FileSystem {
        /// The path involved in the failed operation
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Version catalog lookup failed (network or remote-format failure)
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Artifact acquisition failed (download or local copy)
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// Builder subprocess exited with a non-zero code
    ///
    /// The build workspace has already been cleaned up by the time this is returned.
    #[error("builder exited with code {code}")]
    Build {
        /// Exit code reported by the builder subprocess
        code: i32,
    },

    /// The persisted status record is corrupt or not a regular file
    #[error("status record error: {0}")]
    Status(#[from] StatusError),

    /// Safety gate tripped: refusing to overwrite a non-empty directory
    #[error(
        "overwriting the existing server directory {path} can cause unintended side effects; \
         delete the directory or enable force to continue"
    )]
    ConfirmationRequired {
        /// The non-empty installation directory
        path: PathBuf,
    },
}

/// Version catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level failure talking to the catalog
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Catalog responded with a non-success HTTP status
    #[error("catalog responded with status {status} for {url}")]
    BadResponse {
        /// HTTP status code returned by the catalog
        status: u16,
        /// The catalog URL that failed
        url: String,
    },

    /// Catalog payload could not be parsed
    #[error("failed to parse catalog response: {0}")]
    Parse(String),

    /// Catalog returned no versions at all
    #[error("catalog listed no versions")]
    Empty,

    /// An explicitly requested version is not in the catalog
    #[error("unknown version {version}; known versions: {known}")]
    UnknownVersion {
        /// The version that was requested
        version: String,
        /// Comma-separated list of known versions
        known: String,
    },
}

/// Artifact acquisition errors
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Network-level failure while downloading
    #[error("download failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Server responded with a non-success HTTP status
    #[error("download of {url} failed with status {status}")]
    BadResponse {
        /// HTTP status code
        status: u16,
        /// The URL being downloaded
        url: String,
    },

    /// Response carried no body to stream
    #[error("download of {url} returned an empty body")]
    EmptyBody {
        /// The URL being downloaded
        url: String,
    },

    /// Writing the artifact to disk failed
    #[error("failed to write artifact to {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The builder finished but its conventional output file is missing
    #[error("builder output not found at {path}")]
    MissingOutput {
        /// Expected output path inside the build workspace
        path: PathBuf,
    },
}

/// Status record errors
///
/// Distinct from "absent": a missing `version.json` is not an error, it simply
/// means the directory has never been provisioned.
#[derive(Debug, Error)]
pub enum StatusError {
    /// The status path exists but is not a regular file
    #[error("not a file: {path}")]
    NotAFile {
        /// The offending path
        path: PathBuf,
    },

    /// The status file exists but could not be read
    #[error("failed to read status file {path}: {source}")]
    Unreadable {
        /// The status file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The status file exists but is not a valid record
    #[error("failed to parse status file {path}: {source}")]
    Corrupt {
        /// The status file path
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Convenience constructor for configuration errors
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Convenience constructor for filesystem errors
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileSystem {
            path: path.into(),
            source,
        }
    }
}
