//! In-memory vault storage for testing.
//!
//! This module provides a thread-safe in-memory implementation of the
//! VaultStore trait, primarily for use in unit tests.

use std::sync::{PoisonError, RwLock};

use crate::error::Result;
use crate::storage::VaultStore;
use crate::vault::Vault;

/// In-memory vault store for testing.
///
/// The vault is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryVaultStore {
    vault: RwLock<Option<Vault>>,
    saves: RwLock<usize>,
}

impl MemoryVaultStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `vault`.
    pub fn with_vault(vault: Vault) -> Self {
        Self {
            vault: RwLock::new(Some(vault)),
            saves: RwLock::new(0),
        }
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        *self.saves.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the stored vault.
    pub fn clear(&self) {
        *self.vault.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl VaultStore for MemoryVaultStore {
    fn load(&self) -> Result<Option<Vault>> {
        let vault = self.vault.read().unwrap_or_else(PoisonError::into_inner);
        Ok(vault.clone())
    }

    fn save(&self, vault: &Vault) -> Result<()> {
        *self.vault.write().unwrap_or_else(PoisonError::into_inner) = Some(vault.clone());
        *self.saves.write().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
