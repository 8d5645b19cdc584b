//! Package installation.
//!
//! An install reference is classified by shape: the empty string means
//! "install everything in this project's dependency list", an explicit
//! path prefix (`./`, `../`, `/`) means a local directory copy, and
//! anything else is a remote package name with an optional `@version`
//! suffix.
//!
//! The manifest-driven loop is best-effort: one failing entry is recorded
//! and the loop moves on. An explicit single install fails hard.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::archive::extract_archive;
use crate::client::RegistryBackend;
use crate::error::{RegistryError, Result};
use crate::manifest::{read_dependency_list, DependencyEntry};

/// A classified install reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRef {
    /// No reference given; install from the project's dependency list.
    Manifest,
    /// A local directory to copy into the project.
    Local(PathBuf),
    /// A package to fetch from the registry.
    Remote {
        name: String,
        /// Requested version from an `@version` suffix. The registry only
        /// serves the latest version, so a pin is surfaced as a notice.
        version: Option<String>,
    },
}

impl PackageRef {
    /// Classify a raw install reference by its shape.
    pub fn classify(reference: &str) -> PackageRef {
        if reference.is_empty() {
            return PackageRef::Manifest;
        }
        if reference.starts_with("./")
            || reference.starts_with("../")
            || reference.starts_with('/')
        {
            return PackageRef::Local(PathBuf::from(reference));
        }
        let entry = DependencyEntry::parse(reference);
        PackageRef::Remote {
            name: entry.name,
            version: entry.version,
        }
    }
}

/// Outcome of an install run.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Packages installed, in completion order.
    pub installed: Vec<String>,
    /// Entries that failed, with the error text.
    pub failed: Vec<(String, String)>,
    /// Informational notices (e.g. ignored version pins).
    pub notices: Vec<String>,
}

impl InstallReport {
    /// Whether every attempted entry succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Installs packages into a project directory.
pub struct Installer<'a> {
    registry: &'a dyn RegistryBackend,
    destination: PathBuf,
    no_deps: bool,
}

impl<'a> Installer<'a> {
    /// Installer targeting the given project directory.
    pub fn new(registry: &'a dyn RegistryBackend, destination: PathBuf) -> Self {
        Installer {
            registry,
            destination,
            no_deps: false,
        }
    }

    /// Skip the dependency lists of installed packages.
    pub fn skip_transitive(mut self, no_deps: bool) -> Self {
        self.no_deps = no_deps;
        self
    }

    /// Install the given reference.
    ///
    /// A manifest-driven run returns `Ok` even when individual entries
    /// fail; inspect the report. Explicit local and remote installs fail
    /// hard.
    pub fn install(&self, reference: &str) -> Result<InstallReport> {
        let mut report = InstallReport::default();
        let mut visited = HashSet::new();

        match PackageRef::classify(reference) {
            PackageRef::Manifest => {
                let entries = match read_dependency_list(&self.destination) {
                    Ok(entries) => entries,
                    // No dependency list means nothing to install.
                    Err(RegistryError::DependencyListNotFound { .. }) => Vec::new(),
                    Err(e) => return Err(e),
                };
                for entry in entries {
                    self.install_remote_entry(&entry, &mut visited, &mut report);
                }
            }
            PackageRef::Local(path) => {
                let name = self.install_local(&path)?;
                report.installed.push(name);
            }
            PackageRef::Remote { name, version } => {
                self.install_remote(&name, version.as_deref(), &mut visited, &mut report)?;
            }
        }

        Ok(report)
    }

    /// Best-effort wrapper: record the failure and keep going.
    fn install_remote_entry(
        &self,
        entry: &DependencyEntry,
        visited: &mut HashSet<String>,
        report: &mut InstallReport,
    ) {
        if let Err(e) = self.install_remote(&entry.name, entry.version.as_deref(), visited, report)
        {
            report.failed.push((entry.name.clone(), format!("{e}")));
        }
    }

    fn install_remote(
        &self,
        name: &str,
        version: Option<&str>,
        visited: &mut HashSet<String>,
        report: &mut InstallReport,
    ) -> Result<()> {
        if !visited.insert(name.to_string()) {
            return Ok(());
        }

        if let Some(version) = version {
            report.notices.push(format!(
                "'{name}': requested version {version} ignored, the registry serves the latest version only"
            ));
        }

        let archive = self.registry.download(name)?;
        extract_archive(archive.path(), &self.destination)?;
        report.installed.push(name.to_string());

        if self.no_deps {
            return Ok(());
        }

        // The extracted package may carry its own dependency list.
        let package_root = self.destination.join(name);
        match read_dependency_list(&package_root) {
            Ok(entries) => {
                for entry in entries {
                    self.install_remote_entry(&entry, visited, report);
                }
            }
            Err(RegistryError::DependencyListNotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Mirror a local package directory into the project: every node in
    /// `source` lands at the same relative position under the project
    /// root, with no intermediate directory.
    fn install_local(&self, source: &Path) -> Result<String> {
        if !source.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("local package directory not found: {}", source.display()),
            )
            .into());
        }
        copy_tree(source, &self.destination)?;
        Ok(source.display().to_string())
    }
}

/// Mirror a directory tree, preserving file modes. Fails on the first
/// I/O error; files already copied stay in place.
fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    std::fs::create_dir_all(target)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let dest = target.join(entry.file_name());
        if path.is_dir() {
            copy_tree(&path, &dest)?;
        } else if path.is_file() {
            // std::fs::copy preserves permissions.
            std::fs::copy(&path, &dest)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::create_archive;
    use crate::client::LocalRegistry;
    use crate::integrity::ContentHash;
    use crate::manifest::DEPENDENCY_LIST_FILE;

    fn write_file(path: &Path, content: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Package a directory and upload it to the local registry.
    fn publish_package(registry: &LocalRegistry, work: &Path, name: &str, files: &[(&str, &str)]) {
        let src = work.join(format!("src-{name}"));
        for (rel, content) in files {
            write_file(&src.join(rel), content.as_bytes());
        }
        let archive = work.join(format!("{name}.tar.gz"));
        create_archive(&src, name, &archive).unwrap();
        let sha256 = ContentHash::compute_file(&archive).unwrap();
        registry
            .upload(name, "0.1.0", "", &sha256, &archive, "tok")
            .unwrap();
    }

    #[test]
    fn classify_empty_is_manifest() {
        assert_eq!(PackageRef::classify(""), PackageRef::Manifest);
    }

    #[test]
    fn classify_path_prefixes_are_local() {
        assert_eq!(
            PackageRef::classify("./pkg"),
            PackageRef::Local(PathBuf::from("./pkg"))
        );
        assert_eq!(
            PackageRef::classify("../pkg"),
            PackageRef::Local(PathBuf::from("../pkg"))
        );
        assert_eq!(
            PackageRef::classify("/abs/pkg"),
            PackageRef::Local(PathBuf::from("/abs/pkg"))
        );
    }

    #[test]
    fn classify_names_are_remote() {
        assert_eq!(
            PackageRef::classify("http-lib"),
            PackageRef::Remote {
                name: "http-lib".to_string(),
                version: None,
            }
        );
        assert_eq!(
            PackageRef::classify("http-lib@1.2.0"),
            PackageRef::Remote {
                name: "http-lib".to_string(),
                version: Some("1.2.0".to_string()),
            }
        );
    }

    #[test]
    fn remote_install_extracts_under_package_name() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        publish_package(&registry, dir.path(), "http-lib", &[("main.swf", "export {}")]);

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let installer = Installer::new(&registry, project.clone());
        let report = installer.install("http-lib").unwrap();

        assert_eq!(report.installed, vec!["http-lib"]);
        assert!(report.is_success());
        assert_eq!(
            std::fs::read(project.join("http-lib/main.swf")).unwrap(),
            b"export {}"
        );
    }

    #[test]
    fn remote_install_missing_package_fails_hard() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));

        let installer = Installer::new(&registry, dir.path().join("project"));
        let err = installer.install("ghost").unwrap_err();
        assert!(matches!(err, RegistryError::Download { .. }));
    }

    #[test]
    fn version_pin_surfaces_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        publish_package(&registry, dir.path(), "http-lib", &[("main.swf", "x")]);

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let report = Installer::new(&registry, project)
            .install("http-lib@9.9.9")
            .unwrap();

        assert_eq!(report.installed, vec!["http-lib"]);
        assert_eq!(report.notices.len(), 1);
        assert!(report.notices[0].contains("9.9.9"));
    }

    #[test]
    fn transitive_dependencies_follow_the_package_list() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        publish_package(&registry, dir.path(), "leaf", &[("main.swf", "leaf")]);
        publish_package(
            &registry,
            dir.path(),
            "app",
            &[("main.swf", "app"), (DEPENDENCY_LIST_FILE, "leaf\n")],
        );

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let report = Installer::new(&registry, project.clone())
            .install("app")
            .unwrap();

        assert_eq!(report.installed, vec!["app", "leaf"]);
        assert!(project.join("leaf/main.swf").is_file());
    }

    #[test]
    fn no_deps_skips_transitive_lists() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        publish_package(&registry, dir.path(), "leaf", &[("main.swf", "leaf")]);
        publish_package(
            &registry,
            dir.path(),
            "app",
            &[("main.swf", "app"), (DEPENDENCY_LIST_FILE, "leaf\n")],
        );

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let report = Installer::new(&registry, project.clone())
            .skip_transitive(true)
            .install("app")
            .unwrap();

        assert_eq!(report.installed, vec!["app"]);
        assert!(!project.join("leaf").exists());
    }

    #[test]
    fn dependency_cycles_terminate() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        publish_package(
            &registry,
            dir.path(),
            "ping",
            &[("main.swf", "x"), (DEPENDENCY_LIST_FILE, "pong\n")],
        );
        publish_package(
            &registry,
            dir.path(),
            "pong",
            &[("main.swf", "x"), (DEPENDENCY_LIST_FILE, "ping\n")],
        );

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let report = Installer::new(&registry, project)
            .install("ping")
            .unwrap();

        assert_eq!(report.installed, vec!["ping", "pong"]);
        assert!(report.is_success());
    }

    #[test]
    fn manifest_loop_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        publish_package(&registry, dir.path(), "good", &[("main.swf", "x")]);

        let project = dir.path().join("project");
        write_file(
            &project.join(DEPENDENCY_LIST_FILE),
            b"good\nmissing\n",
        );

        let report = Installer::new(&registry, project.clone())
            .install("")
            .unwrap();

        assert_eq!(report.installed, vec!["good"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "missing");
        assert!(project.join("good/main.swf").is_file());
    }

    #[test]
    fn missing_dependency_list_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let report = Installer::new(&registry, project).install("").unwrap();
        assert!(report.installed.is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn transitive_failure_is_recorded_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        publish_package(
            &registry,
            dir.path(),
            "app",
            &[("main.swf", "x"), (DEPENDENCY_LIST_FILE, "ghost\n")],
        );

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let report = Installer::new(&registry, project)
            .install("app")
            .unwrap();

        assert_eq!(report.installed, vec!["app"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "ghost");
    }

    #[test]
    fn local_install_mirrors_relative_positions() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));

        let source = dir.path().join("mypkg");
        write_file(&source.join("main.swf"), b"local");
        write_file(&source.join("lib/util.swf"), b"util");

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let report = Installer::new(&registry, project.clone())
            .install(source.to_str().unwrap())
            .unwrap();

        assert_eq!(report.installed, vec![source.display().to_string()]);
        // Contents land at the same relative position, not under a
        // directory named after the source.
        assert_eq!(std::fs::read(project.join("main.swf")).unwrap(), b"local");
        assert_eq!(std::fs::read(project.join("lib/util.swf")).unwrap(), b"util");
        assert!(!project.join("mypkg").exists());
    }

    #[test]
    fn local_install_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));

        let installer = Installer::new(&registry, dir.path().join("project"));
        let missing = dir.path().join("nope");
        let err = installer.install(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
    }
}
