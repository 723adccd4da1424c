//! Vault storage for BreakVault.
//!
//! This module provides persistence for the vault document,
//! supporting file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileVaultStore;
pub use memory::MemoryVaultStore;
pub use traits::VaultStore;

use crate::config::Config;
use crate::error::Result;
use crate::seed;
use crate::vault::Vault;

/// Load the vault, creating it on first run.
///
/// A brand new vault is seeded with example data when the config asks for
/// it, and saved right away so later commands see the same ids.
pub fn open_vault<S: VaultStore>(store: &S, config: &Config) -> Result<Vault> {
    if let Some(vault) = store.load()? {
        return Ok(vault);
    }

    let mut vault = Vault::new();
    if config.seed.example_data {
        seed::prepopulate(&mut vault)?;
    }
    store.save(&vault)?;
    tracing::info!("created new vault");
    Ok(vault)
}
