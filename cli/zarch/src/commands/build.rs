//! `zarch build` — stage a distributable copy of the package.
//!
//! Staging copies the descriptor, README and entry point into `dist/`
//! and generates an `install.sh` that installs the package system-wide.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use zarch_registry::manifest::{PackageManifest, MANIFEST_FILE};

pub fn run(project_dir: &Path) -> Result<()> {
    let manifest = PackageManifest::load(project_dir)
        .context("no zarch.json found (run from a package directory)")?;

    println!("Building {} v{}", manifest.name, manifest.version);

    let dist = project_dir.join("dist");
    fs::create_dir_all(&dist).context("creating dist/ directory")?;

    list_source_files(project_dir)?;

    let staged = [MANIFEST_FILE, "README.md", manifest.entry_point.as_str()];
    for file in staged {
        if file.is_empty() {
            continue;
        }
        let src = project_dir.join(file);
        if src.is_file() {
            fs::copy(&src, dist.join(file)).with_context(|| format!("staging {file}"))?;
        }
    }

    let script = install_script(&manifest);
    let script_path = dist.join("install.sh");
    fs::write(&script_path, script).context("writing install.sh")?;
    make_executable(&script_path)?;

    println!("Build complete: {}", dist.display());
    Ok(())
}

/// Print the SwiftFlow sources that would be compiled. Actual compilation
/// happens through `zarch compile` per file.
fn list_source_files(project_dir: &Path) -> Result<()> {
    for entry in fs::read_dir(project_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.ends_with(".swf") && entry.path().is_file() {
            println!("  {name}");
        }
    }
    Ok(())
}

fn install_script(manifest: &PackageManifest) -> String {
    format!(
        r#"#!/bin/bash
# Install script for {name}

echo "Installing {name} v{version}..."

mkdir -p /usr/local/lib/swift
mkdir -p /usr/local/bin

cp -r . /usr/local/lib/swift/{name}

if [ -f "{entry}" ]; then
    ln -sf /usr/local/lib/swift/{name}/{entry} /usr/local/bin/{name}
    chmod +x /usr/local/bin/{name}
    echo "{name} installed to /usr/local/bin/"
else
    echo "entry point not found: {entry}"
fi

echo "Done."
"#,
        name = manifest.name,
        version = manifest.version,
        entry = manifest.entry_point,
    )
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
