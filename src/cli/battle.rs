//! Battle command for BreakVault.
//!
//! Manages battle combos and tracks which rounds have been used during a
//! battle.

use serde::Serialize;

use super::{failure_text, read_vault, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::core::{BattleComboWithTags, EnergyLevel, TrainingStatus};
use crate::error::VaultError;
use crate::storage::VaultStore;
use crate::vault::BattleComboUpdate;

/// Output format for the battle command.
#[derive(Debug, Clone, Serialize)]
pub struct BattleOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub action: String,
    pub combos: Vec<BattleComboWithTags>,
    /// Number of combos reset by `battle reset`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<usize>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BattleOutput {
    fn success(action: &str, combos: Vec<BattleComboWithTags>) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            combos,
            reset: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: String::new(),
            combos: Vec::new(),
            reset: None,
            error: Some(error.into()),
        }
    }
}

/// Filters for `battle list`.
#[derive(Debug, Clone, Default)]
pub struct BattleListFilter {
    pub energy: Option<EnergyLevel>,
    pub status: Option<TrainingStatus>,
    /// Hide combos already used in this battle.
    pub unused_only: bool,
}

/// The battle command implementation.
pub struct BattleCommand<S: VaultStore> {
    store: S,
    config: Config,
}

impl<S: VaultStore> BattleCommand<S> {
    /// Create a new battle command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// List battle combos ordered by energy, then creation time.
    pub fn list(&self, filter: &BattleListFilter) -> BattleOutput {
        match read_vault(&self.store, &self.config) {
            Ok(vault) => {
                let combos = vault
                    .battle_combos_with_tags()
                    .into_iter()
                    .filter(|c| filter.energy.is_none_or(|e| c.combo.energy == e))
                    .filter(|c| filter.status.is_none_or(|s| c.combo.status == s))
                    .filter(|c| !(filter.unused_only && c.combo.is_used))
                    .collect();
                BattleOutput::success("listed", combos)
            }
            Err(e) => BattleOutput::failure(e.to_string()),
        }
    }

    pub fn show(&self, key: &str) -> BattleOutput {
        let result = read_vault(&self.store, &self.config).and_then(|vault| {
            let id = vault.resolve_battle_combo(key)?.id.clone();
            Ok(vault.battle_combo_with_tags(&id).into_iter().collect())
        });
        match result {
            Ok(combos) => BattleOutput::success("shown", combos),
            Err(e) => BattleOutput::failure(e.to_string()),
        }
    }

    /// Add a battle combo. Unknown tag names are created.
    pub fn add(
        &self,
        description: &str,
        energy: EnergyLevel,
        status: TrainingStatus,
        tags: &[String],
    ) -> BattleOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let combo = vault.add_battle_combo(description, energy, status, tags)?;
            Ok(vault.battle_combo_with_tags(&combo.id).into_iter().collect())
        });
        match result {
            Ok(combos) => BattleOutput::success("added", combos),
            Err(e) => BattleOutput::failure(e.to_string()),
        }
    }

    pub fn edit(&self, key: &str, update: BattleComboUpdate) -> BattleOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_battle_combo(key)?.id.clone();
            vault.update_battle_combo(&id, update)?;
            Ok(vault.battle_combo_with_tags(&id).into_iter().collect())
        });
        match result {
            Ok(combos) => BattleOutput::success("updated", combos),
            Err(e) => BattleOutput::failure(e.to_string()),
        }
    }

    /// Flip the used flag of a combo.
    pub fn toggle(&self, key: &str) -> BattleOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_battle_combo(key)?.id.clone();
            vault.toggle_battle_combo_used(&id)?;
            vault
                .battle_combo_with_tags(&id)
                .map(|c| vec![c])
                .ok_or_else(|| VaultError::not_found("battle combo", id))
        });
        match result {
            Ok(combos) => BattleOutput::success("toggled", combos),
            Err(e) => BattleOutput::failure(e.to_string()),
        }
    }

    /// Mark every combo unused, ready for a new battle.
    pub fn reset(&self) -> BattleOutput {
        match write_vault(&self.store, &self.config, |vault| Ok(vault.reset_battle())) {
            Ok(count) => BattleOutput {
                reset: Some(count),
                ..BattleOutput::success("reset", Vec::new())
            },
            Err(e) => BattleOutput::failure(e.to_string()),
        }
    }

    pub fn delete(&self, key: &str) -> BattleOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_battle_combo(key)?.id.clone();
            let removed = vault.battle_combo_with_tags(&id);
            vault.delete_battle_combo(&id)?;
            Ok(removed.into_iter().collect())
        });
        match result {
            Ok(combos) => BattleOutput::success("deleted", combos),
            Err(e) => BattleOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &BattleOutput, options: &OutputOptions) -> String {
        render(output, options, format_human_readable)
    }
}

fn format_human_readable(output: &BattleOutput) -> String {
    if !output.success {
        return failure_text("Battle command", output.error.as_deref());
    }
    if let Some(count) = output.reset {
        return format!("Battle reset: {} combos marked unused.\n", count);
    }
    if output.action == "listed" && output.combos.is_empty() {
        return "No battle combos.\n".to_string();
    }

    let mut text = String::new();
    if output.action != "listed" && output.action != "shown" {
        text.push_str(&format!("Battle combo {}.\n", output.action));
    }
    for c in &output.combos {
        let used = if c.combo.is_used { "x" } else { " " };
        let tags: Vec<&str> = c.tags.iter().map(|t| t.name.as_str()).collect();
        text.push_str(&format!(
            "[{}] {}  ({}, {})  [{}]",
            used, c.combo.description, c.combo.energy, c.combo.status, c.combo.id
        ));
        if !tags.is_empty() {
            text.push_str(&format!("  tags: {}", tags.join(", ")));
        }
        text.push('\n');
    }
    text
}
