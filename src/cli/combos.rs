//! Combo command for BreakVault.
//!
//! Manages saved combos: named lists of move names.

use serde::Serialize;

use super::{failure_text, read_vault, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::core::{format_combo, SavedCombo};
use crate::storage::VaultStore;

/// Output format for the combo command.
#[derive(Debug, Clone, Serialize)]
pub struct ComboOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub action: String,
    pub combos: Vec<SavedCombo>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComboOutput {
    fn success(action: &str, combos: Vec<SavedCombo>) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            combos,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: String::new(),
            combos: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The combo command implementation.
pub struct ComboCommand<S: VaultStore> {
    store: S,
    config: Config,
}

impl<S: VaultStore> ComboCommand<S> {
    /// Create a new combo command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// List saved combos, newest first.
    pub fn list(&self) -> ComboOutput {
        match read_vault(&self.store, &self.config) {
            Ok(vault) => ComboOutput::success("listed", vault.saved_combos()),
            Err(e) => ComboOutput::failure(e.to_string()),
        }
    }

    pub fn show(&self, key: &str) -> ComboOutput {
        let result = read_vault(&self.store, &self.config)
            .and_then(|vault| vault.resolve_saved_combo(key).cloned());
        match result {
            Ok(combo) => ComboOutput::success("shown", vec![combo]),
            Err(e) => ComboOutput::failure(e.to_string()),
        }
    }

    /// Save a combo by hand. A blank name gets a timestamped default.
    pub fn save(&self, name: &str, moves: Vec<String>) -> ComboOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            vault.save_combo(name, moves)
        });
        match result {
            Ok(combo) => ComboOutput::success("saved", vec![combo]),
            Err(e) => ComboOutput::failure(e.to_string()),
        }
    }

    /// Rename a combo and/or replace its moves.
    pub fn edit(&self, key: &str, name: Option<&str>, moves: Option<Vec<String>>) -> ComboOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_saved_combo(key)?.id.clone();
            vault.update_saved_combo(&id, name, moves)
        });
        match result {
            Ok(combo) => ComboOutput::success("updated", vec![combo]),
            Err(e) => ComboOutput::failure(e.to_string()),
        }
    }

    pub fn delete(&self, key: &str) -> ComboOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_saved_combo(key)?.id.clone();
            vault.delete_saved_combo(&id)
        });
        match result {
            Ok(combo) => ComboOutput::success("deleted", vec![combo]),
            Err(e) => ComboOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ComboOutput, options: &OutputOptions) -> String {
        render(output, options, format_human_readable)
    }
}

fn format_human_readable(output: &ComboOutput) -> String {
    if !output.success {
        return failure_text("Combo command", output.error.as_deref());
    }
    if output.action == "listed" && output.combos.is_empty() {
        return "No saved combos yet.\n".to_string();
    }

    let mut text = String::new();
    if output.action != "listed" && output.action != "shown" {
        text.push_str(&format!("Combo {}.\n", output.action));
    }
    for combo in &output.combos {
        text.push_str(&format!(
            "{}  [{}]\n  {}\n",
            combo.name,
            combo.id,
            format_combo(&combo.moves)
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryVaultStore;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryVaultStore>, ComboCommand<Arc<MemoryVaultStore>>) {
        let store = Arc::new(MemoryVaultStore::new());
        let cmd = ComboCommand::new(Arc::clone(&store), Config::default());
        (store, cmd)
    }

    fn moves(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_list_seeded_combos() {
        let (_store, cmd) = setup();

        let output = cmd.list();

        assert!(output.success);
        assert_eq!(output.combos.len(), 3);
    }

    #[test]
    fn test_save_and_show() {
        let (_store, cmd) = setup();

        let saved = cmd.save("Drill", moves(&["CC", "6-Step", "CC"]));
        assert!(saved.success);

        let shown = cmd.show("drill");
        assert_eq!(shown.combos[0].moves, moves(&["CC", "6-Step", "CC"]));
    }

    #[test]
    fn test_save_without_moves_fails() {
        let (_store, cmd) = setup();
        assert!(!cmd.save("Empty", vec![]).success);
    }

    #[test]
    fn test_edit_and_delete() {
        let (store, cmd) = setup();

        let edited = cmd.edit("Power Finisher", Some("Finisher"), None);
        assert!(edited.success);
        assert_eq!(edited.combos[0].name, "Finisher");

        let deleted = cmd.delete("Finisher");
        assert!(deleted.success);
        let vault = store.load().unwrap().unwrap();
        assert_eq!(vault.saved_combos().len(), 2);
    }

    #[test]
    fn test_format_shows_arrow_text() {
        let (_store, cmd) = setup();
        let output = cmd.show("Classic Footwork");

        let formatted = cmd.format_output(&output, &OutputOptions::default());

        assert!(formatted.contains("6-Step  ->  CC"));
    }
}
