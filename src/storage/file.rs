//! File-based vault storage for BreakVault.
//!
//! The vault is stored as one pretty-printed JSON document, by default
//! `~/.breakvault/vault.json`. Writes go through a temp file + rename.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::storage::VaultStore;
use crate::util::{atomic_write, read_to_string_limited};
use crate::vault::{Vault, VAULT_SCHEMA_VERSION};

/// File-based vault storage.
#[derive(Debug, Clone)]
pub struct FileVaultStore {
    /// Path of the vault document.
    path: PathBuf,
}

impl FileVaultStore {
    /// Create a store at the path the config resolves to.
    pub fn from_config(config: &Config) -> Result<Self> {
        let path = config.data_file_path().ok_or_else(|| {
            VaultError::config("Could not determine vault file location (no home directory)")
        })?;
        Ok(Self::with_path(path))
    }

    /// Create a store for a specific file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VaultStore for FileVaultStore {
    fn load(&self) -> Result<Option<Vault>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = read_to_string_limited(&self.path)?;
        let vault: Vault = serde_json::from_str(&content).map_err(|e| {
            VaultError::serde(format!("{}: {}", self.path.display(), e))
        })?;

        if vault.schema_version() > VAULT_SCHEMA_VERSION {
            return Err(VaultError::serde(format!(
                "{} was written by a newer version (schema {}, supported {})",
                self.path.display(),
                vault.schema_version(),
                VAULT_SCHEMA_VERSION
            )));
        }
        vault.check_integrity()?;

        tracing::debug!(path = %self.path.display(), "loaded vault");
        Ok(Some(vault))
    }

    fn save(&self, vault: &Vault) -> Result<()> {
        let json = serde_json::to_string_pretty(vault)?;
        atomic_write(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), bytes = json.len(), "saved vault");
        Ok(())
    }
}
