//! Tag command for BreakVault.
//!
//! Manages move tags. Deleting a tag unlinks it from every move; the moves
//! themselves are kept.

use serde::Serialize;

use super::{failure_text, read_vault, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::core::TagWithMoves;
use crate::storage::VaultStore;

/// Output format for the tag command.
#[derive(Debug, Clone, Serialize)]
pub struct TagOutput {
    /// Whether the command succeeded.
    pub success: bool,
    /// What happened ("listed", "added", ...).
    pub action: String,
    /// Tags affected or listed, with their moves.
    pub tags: Vec<TagWithMoves>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TagOutput {
    fn success(action: &str, tags: Vec<TagWithMoves>) -> Self {
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

/// The tag command implementation.
pub struct TagCommand<S: VaultStore> {
    store: S,
    config: Config,
}

impl<S: VaultStore> TagCommand<S> {
    /// Create a new tag command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// List every tag with its moves.
    pub fn list(&self) -> TagOutput {
        match read_vault(&self.store, &self.config) {
            Ok(vault) => TagOutput::success("listed", vault.tags_with_moves()),
            Err(e) => TagOutput::failure(e.to_string()),
        }
    }

    pub fn add(&self, name: &str) -> TagOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let tag = vault.add_move_tag(name)?;
            Ok(vault.tag_with_moves(&tag.id).into_iter().collect())
        });
        match result {
            Ok(tags) => TagOutput::success("added", tags),
            Err(e) => TagOutput::failure(e.to_string()),
        }
    }

    pub fn rename(&self, key: &str, new_name: &str) -> TagOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_move_tag(key)?.id.clone();
            vault.rename_move_tag(&id, new_name)?;
            Ok(vault.tag_with_moves(&id).into_iter().collect())
        });
        match result {
            Ok(tags) => TagOutput::success("renamed", tags),
            Err(e) => TagOutput::failure(e.to_string()),
        }
    }

    pub fn delete(&self, key: &str) -> TagOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_move_tag(key)?.id.clone();
            let removed = vault.tag_with_moves(&id);
            vault.delete_move_tag(&id)?;
            Ok(removed.into_iter().collect())
        });
        match result {
            Ok(tags) => TagOutput::success("deleted", tags),
            Err(e) => TagOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &TagOutput, options: &OutputOptions) -> String {
        render(output, options, format_human_readable)
    }
}

fn format_human_readable(output: &TagOutput) -> String {
    if !output.success {
        return failure_text("Tag command", output.error.as_deref());
    }

    match output.action.as_str() {
        "listed" if output.tags.is_empty() => "No tags yet.\n".to_string(),
        "listed" => output
            .tags
            .iter()
            .map(|t| format!("{}  [{}]  {} moves\n", t.tag.name, t.tag.id, t.moves.len()))
            .collect(),
        "deleted" => output
            .tags
            .iter()
            .map(|t| {
                format!(
                    "Tag deleted: {} (removed from {} moves)\n",
                    t.tag.name,
                    t.moves.len()
                )
            })
            .collect(),
        action => output
            .tags
            .iter()
            .map(|t| format!("Tag {}: {}  [{}]\n", action, t.tag.name, t.tag.id))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryVaultStore;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryVaultStore>, TagCommand<Arc<MemoryVaultStore>>) {
        let store = Arc::new(MemoryVaultStore::new());
        let cmd = TagCommand::new(Arc::clone(&store), Config::default());
        (store, cmd)
    }

    #[test]
    fn test_list_tags_with_counts() {
        let (_store, cmd) = setup();

        let output = cmd.list();

        assert!(output.success);
        let names: Vec<&str> = output.tags.iter().map(|t| t.tag.name.as_str()).collect();
        assert_eq!(names, vec!["Footwork", "Freeze", "Power", "Toprock"]);
        assert_eq!(output.tags[2].moves.len(), 2);
    }

    #[test]
    fn test_add_duplicate_tag_fails() {
        let (_store, cmd) = setup();

        let output = cmd.add("POWER");

        assert!(!output.success);
        assert!(output.error.unwrap().contains("already exists"));
    }

    #[test]
    fn test_rename_tag() {
        let (store, cmd) = setup();

        let output = cmd.rename("Toprock", "Uprock");

        assert!(output.success);
        let vault = store.load().unwrap().unwrap();
        assert!(vault.resolve_move_tag("Uprock").is_ok());
        assert!(vault.resolve_move_tag("Toprock").is_err());
    }

    #[test]
    fn test_delete_tag_keeps_moves() {
        let (store, cmd) = setup();

        let output = cmd.delete("Power");

        assert!(output.success);
        assert_eq!(output.tags[0].moves.len(), 2);
        let vault = store.load().unwrap().unwrap();
        assert_eq!(vault.moves().len(), 6);
        assert!(vault.resolve_move_tag("Power").is_err());
    }

    #[test]
    fn test_format_delete_message() {
        let (_store, cmd) = setup();
        let output = cmd.delete("Freeze");

        let formatted = cmd.format_output(&output, &OutputOptions::default());

        assert_eq!(formatted, "Tag deleted: Freeze (removed from 1 moves)\n");
    }
}
