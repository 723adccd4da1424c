//! Move command for BreakVault.
//!
//! Lists, shows, adds, edits and deletes moves. Tags are given by id or name.

use serde::Serialize;

use super::{failure_text, read_vault, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::core::MoveWithTags;
use crate::error::Result;
use crate::storage::VaultStore;
use crate::vault::Vault;

/// Output format for the move command.
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutput {
    /// Whether the command succeeded.
    pub success: bool,
    /// What happened ("listed", "added", ...).
    pub action: String,
    /// Moves affected or listed.
    pub moves: Vec<MoveWithTags>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoveOutput {
    fn success(action: &str, moves: Vec<MoveWithTags>) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            moves,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: String::new(),
            moves: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The move command implementation.
pub struct MoveCommand<S: VaultStore> {
    store: S,
    config: Config,
}

impl<S: VaultStore> MoveCommand<S> {
    /// Create a new move command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// List moves, optionally only those carrying `tag`.
    pub fn list(&self, tag: Option<&str>) -> MoveOutput {
        self.try_list(tag).unwrap_or_else(|e| MoveOutput::failure(e.to_string()))
    }

    fn try_list(&self, tag: Option<&str>) -> Result<MoveOutput> {
        let vault = read_vault(&self.store, &self.config)?;
        let moves = match tag {
            Some(key) => {
                let tag_id = vault.resolve_move_tag(key)?.id.clone();
                vault
                    .moves_with_tags()
                    .into_iter()
                    .filter(|m| m.has_tag(&tag_id))
                    .collect()
            }
            None => vault.moves_with_tags(),
        };
        Ok(MoveOutput::success("listed", moves))
    }

    /// Show one move.
    pub fn show(&self, key: &str) -> MoveOutput {
        let result = read_vault(&self.store, &self.config).and_then(|vault| {
            let id = vault.resolve_move(key)?.id.clone();
            Ok(vault.move_with_tags(&id).into_iter().collect())
        });
        match result {
            Ok(moves) => MoveOutput::success("shown", moves),
            Err(e) => MoveOutput::failure(e.to_string()),
        }
    }

    /// Add a move with the given tags.
    pub fn add(&self, name: &str, tags: &[String]) -> MoveOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let tag_ids = resolve_tag_ids(vault, tags)?;
            let mv = vault.add_move(name, &tag_ids)?;
            Ok(vault.move_with_tags(&mv.id).into_iter().collect())
        });
        match result {
            Ok(moves) => MoveOutput::success("added", moves),
            Err(e) => MoveOutput::failure(e.to_string()),
        }
    }

    /// Rename a move and/or replace its tags.
    pub fn edit(&self, key: &str, name: Option<&str>, tags: Option<&[String]>) -> MoveOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_move(key)?.id.clone();
            let tag_ids = match tags {
                Some(keys) => Some(resolve_tag_ids(vault, keys)?),
                None => None,
            };
            vault.update_move(&id, name, tag_ids.as_deref())?;
            Ok(vault.move_with_tags(&id).into_iter().collect())
        });
        match result {
            Ok(moves) => MoveOutput::success("updated", moves),
            Err(e) => MoveOutput::failure(e.to_string()),
        }
    }

    /// Delete a move. Saved combos keep its name.
    pub fn delete(&self, key: &str) -> MoveOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_move(key)?.id.clone();
            let removed = vault.move_with_tags(&id);
            vault.delete_move(&id)?;
            Ok(removed.into_iter().collect())
        });
        match result {
            Ok(moves) => MoveOutput::success("deleted", moves),
            Err(e) => MoveOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &MoveOutput, options: &OutputOptions) -> String {
        render(output, options, format_human_readable)
    }
}

/// Resolve tag ids or names to ids.
pub(crate) fn resolve_tag_ids(vault: &Vault, keys: &[String]) -> Result<Vec<String>> {
    keys.iter()
        .map(|key| vault.resolve_move_tag(key).map(|t| t.id.clone()))
        .collect()
}

fn format_human_readable(output: &MoveOutput) -> String {
    if !output.success {
        return failure_text("Move command", output.error.as_deref());
    }

    if output.action == "listed" && output.moves.is_empty() {
        return "No moves yet. Add one with `breakvault move add <name>`.\n".to_string();
    }

    let mut text = String::new();
    if output.action != "listed" && output.action != "shown" {
        text.push_str(&format!("Move {}.\n", output.action));
    }
    for m in &output.moves {
        let tags = m.tag_names();
        if tags.is_empty() {
            text.push_str(&format!("{}  [{}]\n", m.mv.name, m.mv.id));
        } else {
            text.push_str(&format!(
                "{}  [{}]  tags: {}\n",
                m.mv.name,
                m.mv.id,
                tags.join(", ")
            ));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryVaultStore;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryVaultStore>, MoveCommand<Arc<MemoryVaultStore>>) {
        let store = Arc::new(MemoryVaultStore::new());
        let cmd = MoveCommand::new(Arc::clone(&store), Config::default());
        (store, cmd)
    }

    #[test]
    fn test_list_seeded_moves() {
        let (_store, cmd) = setup();

        let output = cmd.list(None);

        assert!(output.success);
        assert_eq!(output.moves.len(), 6);
        // Ordered by name
        assert_eq!(output.moves[0].mv.name, "6-Step");
    }

    #[test]
    fn test_list_by_tag_name() {
        let (_store, cmd) = setup();

        let output = cmd.list(Some("power"));

        let names: Vec<&str> = output.moves.iter().map(|m| m.mv.name.as_str()).collect();
        assert_eq!(names, vec!["Backspin", "Windmill"]);
    }

    #[test]
    fn test_list_unknown_tag_fails() {
        let (_store, cmd) = setup();

        let output = cmd.list(Some("Nope"));

        assert!(!output.success);
        assert!(output.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_add_move_with_tag_names() {
        let (store, cmd) = setup();

        let output = cmd.add("Airflare", &["Power".to_string(), "freeze".to_string()]);

        assert!(output.success);
        assert_eq!(output.moves[0].tags.len(), 2);
        let vault = store.load().unwrap().unwrap();
        assert!(vault.resolve_move("airflare").is_ok());
    }

    #[test]
    fn test_add_move_unknown_tag_saves_nothing() {
        let (store, cmd) = setup();

        let output = cmd.add("Airflare", &["Tricks".to_string()]);

        assert!(!output.success);
        let vault = store.load().unwrap().unwrap();
        assert!(vault.resolve_move("Airflare").is_err());
    }

    #[test]
    fn test_edit_and_delete() {
        let (store, cmd) = setup();

        let tags = vec!["Power".to_string()];
        let edited = cmd.edit("CC", Some("Coffee Grinder"), Some(tags.as_slice()));
        assert!(edited.success);
        assert_eq!(edited.moves[0].mv.name, "Coffee Grinder");
        assert_eq!(edited.moves[0].tag_names(), vec!["Power"]);

        let deleted = cmd.delete("coffee grinder");
        assert!(deleted.success);

        let vault = store.load().unwrap().unwrap();
        assert_eq!(vault.moves().len(), 5);
        // The seeded saved combo still names the old move
        assert!(vault
            .saved_combos()
            .iter()
            .any(|c| c.moves.contains(&"CC".to_string())));
    }

    #[test]
    fn test_show_missing_move() {
        let (_store, cmd) = setup();
        assert!(!cmd.show("Nope").success);
    }

    #[test]
    fn test_format_output_human_readable() {
        let (_store, cmd) = setup();
        let output = cmd.show("Windmill");

        let formatted = cmd.format_output(&output, &OutputOptions::default());

        assert!(formatted.contains("Windmill"));
        assert!(formatted.contains("tags: Power"));
    }

    #[test]
    fn test_format_output_json() {
        let (_store, cmd) = setup();
        let output = cmd.show("Windmill");
        let options = OutputOptions {
            json: true,
            ..Default::default()
        };

        let formatted = cmd.format_output(&output, &options);

        assert!(formatted.contains("\"success\": true"));
        assert!(formatted.contains("\"move\""));
    }

    #[test]
    fn test_format_failure() {
        let (_store, cmd) = setup();
        let output = MoveOutput::failure("boom");

        let formatted = cmd.format_output(&output, &OutputOptions::default());
        assert_eq!(formatted, "Move command failed: boom\n");
    }
}
