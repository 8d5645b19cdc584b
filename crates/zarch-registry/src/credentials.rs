//! Credential storage for registry authentication.
//!
//! A successful login stores a bearer token with a client-assigned expiry
//! under `~/.zarch/credentials.json`. Tokens are never refreshed: once
//! expired, a new `zarch login` is required.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Client-assigned token lifetime.
const TOKEN_TTL_HOURS: i64 = 24;

/// A stored bearer token with its owner and expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Registry account name.
    pub username: String,
    /// Bearer token returned by the registry.
    pub token: String,
    /// Expiry timestamp, RFC3339.
    pub expiry: String,
}

impl Credentials {
    /// Create credentials expiring [`TOKEN_TTL_HOURS`] from now.
    ///
    /// The registry's own expiry, if any, is ignored; the client
    /// manufactures its own TTL.
    pub fn new(username: &str, token: &str) -> Self {
        let expiry = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).to_rfc3339();
        Credentials {
            username: username.to_string(),
            token: token.to_string(),
            expiry,
        }
    }

    /// Whether the token has expired. An unparseable expiry counts as
    /// expired.
    pub fn is_expired(&self) -> bool {
        match DateTime::parse_from_rfc3339(&self.expiry) {
            Ok(expiry) => Utc::now() > expiry,
            Err(_) => true,
        }
    }
}

/// Where credentials live.
///
/// Injected into login and publish so tests can substitute an in-memory
/// store for the per-user credentials file.
pub trait CredentialStore {
    /// Load stored credentials. Fails with [`RegistryError::Auth`] when
    /// none are stored.
    fn load(&self) -> Result<Credentials>;

    /// Persist credentials, replacing any previous ones.
    fn store(&self, credentials: &Credentials) -> Result<()>;
}

/// The per-user credentials file, `~/.zarch/credentials.json`.
pub struct FsCredentialStore {
    path: PathBuf,
}

impl FsCredentialStore {
    /// Store backed by the default per-user path.
    pub fn default_path() -> Result<Self> {
        let home = home_dir().ok_or_else(|| RegistryError::Auth {
            detail: "could not determine home directory".to_string(),
        })?;
        Ok(FsCredentialStore {
            path: home.join(".zarch").join("credentials.json"),
        })
    }

    /// Store backed by a specific file path.
    pub fn with_path(path: PathBuf) -> Self {
        FsCredentialStore { path }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FsCredentialStore {
    fn load(&self) -> Result<Credentials> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::Auth {
                    detail: "no stored credentials (run `zarch login` first)".to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&data).map_err(|e| RegistryError::Parse {
            detail: format!("{}: {e}", self.path.display()),
        })
    }

    fn store(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(credentials)?;
        write_restricted(&self.path, data.as_bytes())?;
        Ok(())
    }
}

/// Write a file readable and writable by the owner only.
#[cfg(unix)]
fn write_restricted(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_restricted(path: &Path, data: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, data)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// An in-memory credential store for tests and embedding.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with credentials.
    pub fn with_credentials(credentials: Credentials) -> Self {
        MemoryCredentialStore {
            credentials: Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Credentials> {
        self.credentials
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RegistryError::Auth {
                detail: "no stored credentials".to_string(),
            })
    }

    fn store(&self, credentials: &Credentials) -> Result<()> {
        *self.credentials.lock().unwrap() = Some(credentials.clone());
        Ok(())
    }
}
