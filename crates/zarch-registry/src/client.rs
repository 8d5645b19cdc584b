//! Registry backend trait and implementations.
//!
//! The `RegistryBackend` trait abstracts over registry implementations so
//! the install and publish orchestrators can be tested without a network.
//! `HttpRegistry` talks to the real zenv-hub registry; `LocalRegistry` is
//! a filesystem-backed backend for development and testing.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::credentials::Credentials;
use crate::error::{RegistryError, Result};
use crate::integrity::ContentHash;

/// Default registry endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://zenv-hub.onrender.com";

/// Environment variable overriding the registry endpoint.
pub const REGISTRY_ENV: &str = "ZARCH_REGISTRY";

/// HTTP request timeout. The transport default (none) is not acceptable
/// for a tool that blocks the terminal.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The registry's view of a package, as returned by search.
///
/// Read-only query output; the client never mutates these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryPackageRecord {
    /// Package name.
    pub name: String,
    /// Publishing scope (`user` for unscoped packages).
    pub scope: String,
    /// Latest published version.
    pub version: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Author.
    #[serde(default)]
    pub author: String,
    /// Download URL relative to the registry base.
    #[serde(default)]
    pub download_url: String,
    /// Archive size in bytes.
    #[serde(default)]
    pub size: u64,
    /// SHA-256 digest of the archive.
    #[serde(default)]
    pub sha256: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RegistryPackageRecord>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Abstract registry backend.
///
/// Four synchronous operations; none retries, and every transport failure
/// propagates immediately with the upstream error text embedded.
pub trait RegistryBackend {
    /// Search for packages by keyword. Fails open: transport and decode
    /// errors yield an empty result set, not an error.
    fn search(&self, query: &str) -> Result<Vec<RegistryPackageRecord>>;

    /// Exchange username/password for bearer credentials.
    fn login(&self, username: &str, password: &str) -> Result<Credentials>;

    /// Upload a package archive under the given identity, authorized by
    /// `token`. `sha256` is the client-computed digest of the archive.
    fn upload(
        &self,
        name: &str,
        version: &str,
        description: &str,
        sha256: &ContentHash,
        archive: &std::path::Path,
        token: &str,
    ) -> Result<()>;

    /// Download the latest version of the named package into a temporary
    /// file. The file is deleted when the returned handle drops.
    fn download(&self, name: &str) -> Result<NamedTempFile>;
}

/// HTTP client for the zenv-hub registry.
pub struct HttpRegistry {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpRegistry {
    /// Client for the default endpoint, honoring the `ZARCH_REGISTRY`
    /// environment override.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var(REGISTRY_ENV).unwrap_or_else(|_| DEFAULT_REGISTRY_URL.to_string());
        Self::with_base_url(&base_url)
    }

    /// Client for a specific endpoint.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::Parse {
                detail: format!("building HTTP client: {e}"),
            })?;
        Ok(HttpRegistry {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// The configured registry endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RegistryBackend for HttpRegistry {
    fn search(&self, query: &str) -> Result<Vec<RegistryPackageRecord>> {
        let url = format!("{}/api/package/search", self.base_url);
        let response = match self.http.get(&url).query(&[("q", query)]).send() {
            Ok(response) => response,
            Err(_) => return Ok(Vec::new()),
        };
        match response.json::<SearchResponse>() {
            Ok(body) => Ok(body.results),
            Err(_) => Ok(Vec::new()),
        }
    }

    fn login(&self, username: &str, password: &str) -> Result<Credentials> {
        let url = format!("{}/api/auth/login", self.base_url);
        let body = serde_json::json!({ "username": username, "password": password });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| RegistryError::Auth {
                detail: format!("login request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(RegistryError::Auth { detail });
        }

        let body: LoginResponse = response.json().map_err(|e| RegistryError::Parse {
            detail: format!("login response: {e}"),
        })?;

        Ok(Credentials::new(username, &body.token))
    }

    fn upload(
        &self,
        name: &str,
        version: &str,
        description: &str,
        sha256: &ContentHash,
        archive: &std::path::Path,
        token: &str,
    ) -> Result<()> {
        let url = format!("{}/api/package/upload/user/{}", self.base_url, name);

        let form = reqwest::blocking::multipart::Form::new()
            .text("version", version.to_string())
            .text("description", description.to_string())
            .text("sha256", sha256.as_str().to_string())
            .file("file", archive)?;

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .map_err(|e| RegistryError::Upload {
                detail: format!("upload request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(RegistryError::Upload { detail });
        }

        Ok(())
    }

    fn download(&self, name: &str) -> Result<NamedTempFile> {
        let url = format!("{}/package/download/user/{}/latest", self.base_url, name);

        let mut response = self.http.get(&url).send().map_err(|e| RegistryError::Download {
            name: name.to_string(),
            detail: format!("download request failed: {e}"),
        })?;

        if !response.status().is_success() {
            return Err(RegistryError::Download {
                name: name.to_string(),
                detail: format!("registry returned {}", response.status()),
            });
        }

        let mut file = NamedTempFile::new()?;
        response
            .copy_to(&mut file)
            .map_err(|e| RegistryError::Download {
                name: name.to_string(),
                detail: format!("reading response body: {e}"),
            })?;
        file.flush()?;
        Ok(file)
    }
}

/// A filesystem-backed registry for development and testing.
///
/// Layout:
/// ```text
/// <root>/
///   <package-name>/
///     latest.tar.gz
///     record.json
/// ```
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    /// Create a local registry rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        LocalRegistry { root }
    }

    fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl RegistryBackend for LocalRegistry {
    fn search(&self, query: &str) -> Result<Vec<RegistryPackageRecord>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let query_lower = query.to_lowercase();
        let mut results = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.to_lowercase().contains(&query_lower) {
                continue;
            }
            let record_path = entry.path().join("record.json");
            if let Ok(data) = std::fs::read_to_string(&record_path) {
                if let Ok(record) = serde_json::from_str(&data) {
                    results.push(record);
                }
            }
        }

        results.sort_by(|a: &RegistryPackageRecord, b| a.name.cmp(&b.name));
        Ok(results)
    }

    fn login(&self, username: &str, _password: &str) -> Result<Credentials> {
        Ok(Credentials::new(username, "local-token"))
    }

    fn upload(
        &self,
        name: &str,
        version: &str,
        description: &str,
        sha256: &ContentHash,
        archive: &std::path::Path,
        token: &str,
    ) -> Result<()> {
        if token.is_empty() {
            return Err(RegistryError::Auth {
                detail: "missing token".to_string(),
            });
        }

        let dir = self.package_dir(name);
        std::fs::create_dir_all(&dir)?;
        std::fs::copy(archive, dir.join("latest.tar.gz"))?;

        let record = RegistryPackageRecord {
            name: name.to_string(),
            scope: "user".to_string(),
            version: version.to_string(),
            description: description.to_string(),
            author: String::new(),
            download_url: format!("/package/download/user/{name}/latest"),
            size: std::fs::metadata(archive)?.len(),
            sha256: sha256.as_str().to_string(),
        };
        std::fs::write(dir.join("record.json"), serde_json::to_string_pretty(&record)?)?;

        Ok(())
    }

    fn download(&self, name: &str) -> Result<NamedTempFile> {
        let archive_path = self.package_dir(name).join("latest.tar.gz");
        let data = std::fs::read(&archive_path).map_err(|e| RegistryError::Download {
            name: name.to_string(),
            detail: e.to_string(),
        })?;

        let mut file = NamedTempFile::new()?;
        file.write_all(&data)?;
        file.flush()?;
        Ok(file)
    }
}
