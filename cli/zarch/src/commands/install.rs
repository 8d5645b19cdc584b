//! `zarch install` — install packages into the current project.

use std::path::Path;

use anyhow::{bail, Result};
use zarch_registry::{Installer, RegistryBackend};

/// Install the given reference into `project_dir`.
///
/// An empty reference installs everything in the project's `SwiftList.txt`.
/// Failures in that mode are reported per entry and turned into a single
/// error at the end so the exit status reflects them.
pub fn run(
    project_dir: &Path,
    registry: &dyn RegistryBackend,
    reference: &str,
    no_deps: bool,
) -> Result<()> {
    let installer = Installer::new(registry, project_dir.to_path_buf()).skip_transitive(no_deps);
    let report = installer.install(reference)?;

    for name in &report.installed {
        println!("Installed {name}");
    }
    for notice in &report.notices {
        println!("note: {notice}");
    }
    if report.installed.is_empty() && report.failed.is_empty() {
        println!("Nothing to install.");
    }

    if !report.is_success() {
        for (name, reason) in &report.failed {
            eprintln!("failed: {name}: {reason}");
        }
        bail!("{} package(s) failed to install", report.failed.len());
    }

    Ok(())
}
