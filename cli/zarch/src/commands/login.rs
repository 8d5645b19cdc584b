//! `zarch login` — authenticate against the registry.

use anyhow::{Context, Result};
use zarch_registry::{CredentialStore, RegistryBackend};

pub fn run(
    registry: &dyn RegistryBackend,
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<()> {
    let credentials = registry.login(username, password).context("login failed")?;
    store
        .store(&credentials)
        .context("storing credentials")?;

    println!("Logged in as '{username}' (token valid for 24 hours)");
    Ok(())
}
