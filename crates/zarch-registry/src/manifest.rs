//! Package descriptor (`zarch.json`) and dependency list (`SwiftList.txt`) parsing.
//!
//! The descriptor is written once by `zarch init` and never rewritten by the
//! tool afterwards; the dependency list is a flat text file, one entry per
//! line, `name` or `name@version`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// File name of the package descriptor in a package root.
pub const MANIFEST_FILE: &str = "zarch.json";

/// File name of the flat dependency list in a package root.
pub const DEPENDENCY_LIST_FILE: &str = "SwiftList.txt";

/// The `zarch.json` package descriptor.
///
/// Missing optional fields take zero-value defaults; no schema validation
/// happens beyond successful deserialization. Publish-time checks live in
/// [`crate::publish`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name (unique per scope within the registry).
    pub name: String,
    /// Semantic version string.
    pub version: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Author.
    #[serde(default)]
    pub author: String,
    /// License identifier (SPDX).
    #[serde(default)]
    pub license: String,
    /// Entry-point file name (e.g. `main.swf`).
    #[serde(default)]
    pub entry_point: String,
    /// Dependency name → version constraint.
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
    /// Script name → shell command.
    #[serde(default)]
    pub scripts: HashMap<String, String>,
    /// Generated documentation, one line per element.
    #[serde(default)]
    pub markdown: Vec<String>,
}

impl PackageManifest {
    /// Load and deserialize the descriptor from a package root.
    ///
    /// Fails with [`RegistryError::ManifestNotFound`] when `zarch.json` is
    /// absent and [`RegistryError::Parse`] when it is malformed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::ManifestNotFound {
                    dir: root.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&data).map_err(|e| RegistryError::Parse {
            detail: format!("{}: {e}", path.display()),
        })
    }

    /// Serialize the descriptor into a package root as pretty-printed JSON.
    ///
    /// Used by `zarch init` only; the tool never rewrites the file after
    /// creation.
    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(root.join(MANIFEST_FILE), data)?;
        Ok(())
    }

    /// Deterministic archive file name: `{name}-v{version}.tar.gz`.
    pub fn archive_name(&self) -> String {
        format!("{}-v{}.tar.gz", self.name, self.version)
    }
}

/// One line of the dependency list: bare `name` or `name@version`.
///
/// Duplicates are not rejected; they cause redundant reinstalls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    /// Package name.
    pub name: String,
    /// Requested version, when the line carries an `@version` suffix.
    pub version: Option<String>,
}

impl DependencyEntry {
    /// Split a non-comment line on the first `@`.
    pub fn parse(line: &str) -> Self {
        match line.split_once('@') {
            Some((name, version)) => DependencyEntry {
                name: name.to_string(),
                version: Some(version.to_string()),
            },
            None => DependencyEntry {
                name: line.to_string(),
                version: None,
            },
        }
    }
}

/// Read `SwiftList.txt` from a package root.
///
/// Blank lines and lines beginning with `#` are skipped. Fails with
/// [`RegistryError::DependencyListNotFound`] when the file is absent;
/// callers treat that the same as an empty list.
pub fn read_dependency_list(root: &Path) -> Result<Vec<DependencyEntry>> {
    let path = root.join(DEPENDENCY_LIST_FILE);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RegistryError::DependencyListNotFound {
                dir: root.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let entries = data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(DependencyEntry::parse)
        .collect();

    Ok(entries)
}
