//! Battle tag command for BreakVault.

use serde::Serialize;

use super::{failure_text, read_vault, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::core::BattleTag;
use crate::storage::VaultStore;

/// Output format for the battle-tag command.
#[derive(Debug, Clone, Serialize)]
pub struct BattleTagOutput {
    pub success: bool,
    pub action: String,
    pub tags: Vec<BattleTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BattleTagOutput {
    fn success(action: &str, tags: Vec<BattleTag>) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            tags,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: String::new(),
            tags: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The battle-tag command implementation.
pub struct BattleTagCommand<S: VaultStore> {
    store: S,
    config: Config,
}

impl<S: VaultStore> BattleTagCommand<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn list(&self) -> BattleTagOutput {
        match read_vault(&self.store, &self.config) {
            Ok(vault) => BattleTagOutput::success("listed", vault.battle_tags()),
            Err(e) => BattleTagOutput::failure(e.to_string()),
        }
    }

    /// Add a tag; an existing tag with the same name is returned instead.
    pub fn add(&self, name: &str) -> BattleTagOutput {
        match write_vault(&self.store, &self.config, |vault| vault.add_battle_tag(name)) {
            Ok(tag) => BattleTagOutput::success("added", vec![tag]),
            Err(e) => BattleTagOutput::failure(e.to_string()),
        }
    }

    pub fn rename(&self, key: &str, new_name: &str) -> BattleTagOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_battle_tag(key)?.id.clone();
            vault.rename_battle_tag(&id, new_name)
        });
        match result {
            Ok(tag) => BattleTagOutput::success("renamed", vec![tag]),
            Err(e) => BattleTagOutput::failure(e.to_string()),
        }
    }

    pub fn delete(&self, key: &str) -> BattleTagOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_battle_tag(key)?.id.clone();
            vault.delete_battle_tag(&id)
        });
        match result {
            Ok(tag) => BattleTagOutput::success("deleted", vec![tag]),
            Err(e) => BattleTagOutput::failure(e.to_string()),
        }
    }

    pub fn format_output(&self, output: &BattleTagOutput, options: &OutputOptions) -> String {
        render(output, options, |output| {
            if !output.success {
                return failure_text("Battle tag command", output.error.as_deref());
            }
            if output.action == "listed" {
                if output.tags.is_empty() {
                    return "No battle tags.\n".to_string();
                }
                return output
                    .tags
                    .iter()
                    .map(|t| format!("{}  [{}]\n", t.name, t.id))
                    .collect();
            }
            output
                .tags
                .iter()
                .map(|t| format!("Battle tag {}: {}  [{}]\n", output.action, t.name, t.id))
                .collect()
        })
    }
}
