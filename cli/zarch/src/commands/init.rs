//! `zarch init` — package scaffolding.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use zarch_registry::manifest::{PackageManifest, DEPENDENCY_LIST_FILE};

/// Create a new SwiftFlow package at `./<name>`.
pub fn run(name: &str) -> Result<()> {
    let package_dir = Path::new(name);
    create_package(package_dir, name)?;

    println!("Created package '{name}'");
    println!("  {name}/zarch.json      - package descriptor");
    println!("  {name}/SwiftList.txt   - dependency list");
    println!("  {name}/main.swf        - entry point");
    println!("  {name}/README.md       - documentation");
    println!("  {name}/.gitignore");
    println!();
    println!("Next steps:");
    println!("  1. cd {name}");
    println!("  2. edit zarch.json with your details");
    println!("  3. add dependencies to SwiftList.txt");
    println!("  4. zarch build");
    println!("  5. zarch publish");
    Ok(())
}

pub(crate) fn create_package(package_dir: &Path, name: &str) -> Result<()> {
    if package_dir.exists() {
        bail!("directory '{}' already exists", package_dir.display());
    }
    fs::create_dir_all(package_dir)
        .with_context(|| format!("creating {}", package_dir.display()))?;

    let manifest = PackageManifest {
        name: name.to_string(),
        version: "1.0.0".to_string(),
        description: "A SwiftFlow package".to_string(),
        author: "anonymous".to_string(),
        license: "MIT".to_string(),
        entry_point: "main.swf".to_string(),
        dependencies: HashMap::new(),
        scripts: HashMap::from([("test".to_string(), "swift test.swf".to_string())]),
        markdown: vec![
            format!("# {name}"),
            String::new(),
            "## Description".to_string(),
            "A SwiftFlow package generated with zarch.".to_string(),
            String::new(),
            "## Installation".to_string(),
            "```bash".to_string(),
            format!("zarch install {name}"),
            "```".to_string(),
        ],
    };
    manifest.save(package_dir).context("writing zarch.json")?;

    fs::write(
        package_dir.join(DEPENDENCY_LIST_FILE),
        "# Package dependencies\n# Format: package@version\n\n",
    )
    .context("writing SwiftList.txt")?;

    let entry = format!(
        "// Package: {name}\n// Version: 1.0.0\n\nexport {{\n    // Export your functions here\n}};\n\nfunc main() {{\n    print(\"Hello from \" + \"{name}\");\n}}\n\nmain();\n"
    );
    fs::write(package_dir.join("main.swf"), entry).context("writing main.swf")?;

    // The README mirrors the descriptor's markdown lines.
    fs::write(package_dir.join("README.md"), manifest.markdown.join("\n"))
        .context("writing README.md")?;

    fs::write(
        package_dir.join(".gitignore"),
        "# Dependencies\nnode_modules/\n\n# Build artifacts\ndist/\nbuild/\n\n# Environment\n.env\n\n# IDE\n.vscode/\n.idea/\n\n# OS\n.DS_Store\n",
    )
    .context("writing .gitignore")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_package_files() {
        let dir = tempfile::tempdir().unwrap();
        let package_path = dir.path().join("my-pkg");

        create_package(&package_path, "my-pkg").unwrap();

        assert!(package_path.join("zarch.json").is_file());
        assert!(package_path.join("SwiftList.txt").is_file());
        assert!(package_path.join("main.swf").is_file());
        assert!(package_path.join("README.md").is_file());
        assert!(package_path.join(".gitignore").is_file());
    }

    #[test]
    fn init_generates_loadable_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let package_path = dir.path().join("descr");

        create_package(&package_path, "descr").unwrap();

        let manifest = PackageManifest::load(&package_path).unwrap();
        assert_eq!(manifest.name, "descr");
        assert_eq!(manifest.version, "1.0.0");
        assert_eq!(manifest.entry_point, "main.swf");
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn init_dependency_list_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let package_path = dir.path().join("deps");

        create_package(&package_path, "deps").unwrap();

        let entries = zarch_registry::read_dependency_list(&package_path).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn init_readme_matches_descriptor_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let package_path = dir.path().join("readme");

        create_package(&package_path, "readme").unwrap();

        let manifest = PackageManifest::load(&package_path).unwrap();
        let readme = fs::read_to_string(package_path.join("README.md")).unwrap();
        assert_eq!(readme, manifest.markdown.join("\n"));
        assert!(readme.starts_with("# readme"));
    }

    #[test]
    fn init_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let package_path = dir.path().join("existing");
        fs::create_dir(&package_path).unwrap();

        let result = create_package(&package_path, "existing");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }
}
