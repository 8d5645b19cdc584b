//! Publishing a package to the registry.
//!
//! The publish pipeline is: load credentials, load the descriptor,
//! validate the version, build the archive next to the project, hash it,
//! upload, then remove the archive. The archive is only removed after a
//! successful upload so a failed attempt leaves it behind for inspection.

use std::path::Path;

use crate::archive::create_archive;
use crate::client::RegistryBackend;
use crate::credentials::CredentialStore;
use crate::error::{RegistryError, Result};
use crate::integrity::ContentHash;
use crate::manifest::PackageManifest;

/// Knobs for a publish run.
#[derive(Debug, Default)]
pub struct PublishOptions {
    /// Build and hash the archive but skip the upload. The archive is
    /// left in the project directory.
    pub dry_run: bool,
}

/// What a publish run produced.
#[derive(Debug)]
pub struct PublishReceipt {
    /// Package name.
    pub name: String,
    /// Published version.
    pub version: String,
    /// Archive file name.
    pub archive_name: String,
    /// Digest sent alongside the archive.
    pub sha256: ContentHash,
    /// False for dry runs.
    pub uploaded: bool,
}

/// Package the project at `project_dir` and upload it.
///
/// Credentials are checked before any work happens; an expired token
/// fails with [`RegistryError::Auth`] rather than letting the registry
/// reject the upload mid-transfer.
pub fn publish(
    project_dir: &Path,
    registry: &dyn RegistryBackend,
    credentials: &dyn CredentialStore,
    options: &PublishOptions,
) -> Result<PublishReceipt> {
    let creds = credentials.load()?;
    if creds.is_expired() {
        return Err(RegistryError::Auth {
            detail: "stored token has expired (run `zarch login` again)".to_string(),
        });
    }

    let manifest = PackageManifest::load(project_dir)?;
    semver::Version::parse(&manifest.version)?;

    let archive_name = manifest.archive_name();
    let archive_path = project_dir.join(&archive_name);
    create_archive(project_dir, &manifest.name, &archive_path)?;
    let sha256 = ContentHash::compute_file(&archive_path)?;

    if options.dry_run {
        return Ok(PublishReceipt {
            name: manifest.name,
            version: manifest.version,
            archive_name,
            sha256,
            uploaded: false,
        });
    }

    registry.upload(
        &manifest.name,
        &manifest.version,
        &manifest.description,
        &sha256,
        &archive_path,
        &creds.token,
    )?;

    std::fs::remove_file(&archive_path)?;

    Ok(PublishReceipt {
        name: manifest.name,
        version: manifest.version,
        archive_name,
        sha256,
        uploaded: true,
    })
}
