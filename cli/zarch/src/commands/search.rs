//! `zarch search` — query the registry.

use anyhow::Result;
use zarch_registry::RegistryBackend;

pub fn run(registry: &dyn RegistryBackend, query: &str) -> Result<()> {
    let results = registry.search(query)?;

    if results.is_empty() {
        println!("No packages found for '{query}'");
        return Ok(());
    }

    println!("Packages matching '{query}':");
    for (i, record) in results.iter().enumerate() {
        println!("{}. @{}/{} v{}", i + 1, record.scope, record.name, record.version);
        if !record.description.is_empty() {
            println!("   {}", record.description);
        }
    }
    Ok(())
}
