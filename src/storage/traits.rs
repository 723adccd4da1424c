//! Vault storage traits for BreakVault.
//!
//! This module defines the `VaultStore` trait for vault persistence.

use std::sync::Arc;

use crate::error::Result;
use crate::vault::Vault;

/// Trait for vault storage backends.
///
/// A store holds exactly one vault document. Commands load it, mutate it in
/// memory and save it back.
pub trait VaultStore: Send + Sync {
    /// Load the vault.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Vault>>;

    /// Replace the stored vault.
    fn save(&self, vault: &Vault) -> Result<()>;

    /// Check if a vault has been saved.
    fn exists(&self) -> Result<bool> {
        Ok(self.load()?.is_some())
    }

    /// Load the vault (or start an empty one), apply `f`, and save.
    ///
    /// Nothing is written when `f` fails, so a failed operation leaves the
    /// stored vault exactly as it was.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Vault) -> Result<T>,
    {
        let mut vault = self.load()?.unwrap_or_default();
        let value = f(&mut vault)?;
        self.save(&vault)?;
        Ok(value)
    }
}

/// Blanket implementation of VaultStore for Arc-wrapped stores.
///
/// This allows sharing one store between tests and commands.
impl<T: VaultStore + ?Sized> VaultStore for Arc<T> {
    fn load(&self) -> Result<Option<Vault>> {
        (**self).load()
    }

    fn save(&self, vault: &Vault) -> Result<()> {
        (**self).save(vault)
    }
}

/// Test utilities for VaultStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::error::VaultError;

    /// Test helper to verify VaultStore implementations.
    pub fn test_vault_store_roundtrip<S: VaultStore>(store: &S) {
        // Nothing saved yet
        assert!(!store.exists().unwrap());
        assert!(store.load().unwrap().is_none());

        // Save a vault with some data
        let mut vault = Vault::new();
        let tag = vault.add_move_tag("Power").unwrap();
        vault.add_move("Windmill", &[tag.id]).unwrap();
        store.save(&vault).unwrap();

        assert!(store.exists().unwrap());
        assert_eq!(store.load().unwrap().unwrap(), vault);

        // A successful update is persisted
        let goal_id = store
            .update(|v| v.create_goal("Airflare", "").map(|g| g.id))
            .unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert!(loaded.goal_by_id(&goal_id).is_some());

        // A failed update changes nothing
        let result: Result<()> = store.update(|v| {
            v.add_move("Flare", &[])?;
            Err(VaultError::validation("boom"))
        });
        assert!(result.is_err());
        assert_eq!(store.load().unwrap().unwrap(), loaded);
    }
}
