//! Package transfer subsystem for the zarch package manager.
//!
//! Handles packaging a SwiftFlow project into a tar+gzip archive,
//! publishing it to the zenv-hub registry, and retrieving/installing
//! packages (remote or local) into a project directory.
//!
//! # Architecture
//!
//! The subsystem is layered, leaves first:
//! - **manifest** — the `zarch.json` descriptor and the flat
//!   `SwiftList.txt` dependency list
//! - **archive** — tar+gzip construction and path-safe extraction
//! - **client** — the four registry operations (search, login,
//!   upload, download) behind a backend trait
//! - **install** / **publish** — the orchestrators composing the above
//!
//! Everything is synchronous and blocking; no operation retries.

pub mod archive;
pub mod client;
pub mod credentials;
pub mod error;
pub mod install;
pub mod integrity;
pub mod manifest;
pub mod publish;

// Re-exports for convenience.
pub use archive::{create_archive, extract_archive};
pub use client::{
    HttpRegistry, LocalRegistry, RegistryBackend, RegistryPackageRecord, DEFAULT_REGISTRY_URL,
    REGISTRY_ENV,
};
pub use credentials::{CredentialStore, Credentials, FsCredentialStore, MemoryCredentialStore};
pub use error::{RegistryError, Result};
pub use install::{InstallReport, Installer, PackageRef};
pub use integrity::ContentHash;
pub use manifest::{read_dependency_list, DependencyEntry, PackageManifest};
pub use publish::{publish, PublishOptions, PublishReceipt};
