//! `zarch publish` — package the current project and upload it.

use std::path::Path;

use anyhow::{Context, Result};
use zarch_registry::{CredentialStore, PublishOptions, RegistryBackend};

pub fn run(
    project_dir: &Path,
    registry: &dyn RegistryBackend,
    store: &dyn CredentialStore,
    dry_run: bool,
) -> Result<()> {
    let options = PublishOptions { dry_run };
    let receipt = zarch_registry::publish(project_dir, registry, store, &options)
        .context("publish failed")?;

    if receipt.uploaded {
        println!("Published {} v{}", receipt.name, receipt.version);
        println!("  archive: {}", receipt.archive_name);
        println!("  sha256:  {}", receipt.sha256);
    } else {
        println!(
            "Dry run: built {} (sha256 {}), nothing uploaded",
            receipt.archive_name, receipt.sha256
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use zarch_registry::{Credentials, LocalRegistry, MemoryCredentialStore};

    #[test]
    fn publish_round_trips_through_registry() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("demo");
        init::create_package(&project, "demo").unwrap();

        let registry = LocalRegistry::new(dir.path().join("registry"));
        let store = MemoryCredentialStore::with_credentials(Credentials::new("alice", "tok"));

        run(&project, &registry, &store, false).unwrap();

        let results = registry.search("demo").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].version, "1.0.0");
    }

    #[test]
    fn publish_dry_run_uploads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("demo");
        init::create_package(&project, "demo").unwrap();

        let registry = LocalRegistry::new(dir.path().join("registry"));
        let store = MemoryCredentialStore::with_credentials(Credentials::new("alice", "tok"));

        run(&project, &registry, &store, true).unwrap();
        assert!(registry.search("demo").unwrap().is_empty());
    }

    #[test]
    fn publish_without_login_fails() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("demo");
        init::create_package(&project, "demo").unwrap();

        let registry = LocalRegistry::new(dir.path().join("registry"));
        let store = MemoryCredentialStore::new();

        assert!(run(&project, &registry, &store, false).is_err());
    }
}
