//! Registry error types.

use std::path::PathBuf;

/// Errors that can occur during package transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Package descriptor (zarch.json) not found.
    #[error("no zarch.json found in {dir}")]
    ManifestNotFound { dir: PathBuf },

    /// Dependency list (SwiftList.txt) not found.
    #[error("no SwiftList.txt found in {dir}")]
    DependencyListNotFound { dir: PathBuf },

    /// Stored credentials missing or expired.
    #[error("not authenticated: {detail}")]
    Auth { detail: String },

    /// Malformed descriptor, credentials file, or registry payload.
    #[error("parse error: {detail}")]
    Parse { detail: String },

    /// Archive entry resolves outside the extraction root.
    #[error("archive entry '{entry}' escapes the destination directory")]
    UnsafeArchivePath { entry: String },

    /// Registry rejected or failed an upload.
    #[error("upload failed: {detail}")]
    Upload { detail: String },

    /// Download from the registry failed.
    #[error("download failed for '{name}': {detail}")]
    Download { name: String, detail: String },

    /// Invalid semantic version at publish time.
    #[error("invalid version: {0}")]
    SemverVersion(#[from] semver::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for package transfer operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
