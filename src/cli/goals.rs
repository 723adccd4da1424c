//! Goal command for BreakVault.
//!
//! Creates, edits, archives and deletes practice goals. Stage progress is
//! handled by the stage command.

use serde::Serialize;

use super::{failure_text, read_vault, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::core::GoalWithStages;
use crate::error::{Result, VaultError};
use crate::storage::VaultStore;
use crate::vault::Vault;

/// Output format for the goal command.
#[derive(Debug, Clone, Serialize)]
pub struct GoalOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub action: String,
    pub goals: Vec<GoalWithStages>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GoalOutput {
    fn success(action: &str, goals: Vec<GoalWithStages>) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            goals,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: String::new(),
            goals: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The goal command implementation.
pub struct GoalCommand<S: VaultStore> {
    store: S,
    config: Config,
}

impl<S: VaultStore> GoalCommand<S> {
    /// Create a new goal command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// List active goals, or archived ones.
    pub fn list(&self, archived: bool) -> GoalOutput {
        match read_vault(&self.store, &self.config) {
            Ok(vault) if archived => GoalOutput::success("listed", vault.archived_goals()),
            Ok(vault) => GoalOutput::success("listed", vault.active_goals()),
            Err(e) => GoalOutput::failure(e.to_string()),
        }
    }

    pub fn show(&self, key: &str) -> GoalOutput {
        let result = read_vault(&self.store, &self.config).and_then(|vault| {
            let id = vault.resolve_goal(key)?.id.clone();
            Ok(vault.goal_with_stages(&id).into_iter().collect())
        });
        match result {
            Ok(goals) => GoalOutput::success("shown", goals),
            Err(e) => GoalOutput::failure(e.to_string()),
        }
    }

    pub fn create(&self, title: &str, description: &str) -> GoalOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let goal = vault.create_goal(title, description)?;
            Ok(vault.goal_with_stages(&goal.id).into_iter().collect())
        });
        match result {
            Ok(goals) => GoalOutput::success("created", goals),
            Err(e) => GoalOutput::failure(e.to_string()),
        }
    }

    pub fn edit(&self, key: &str, title: Option<&str>, description: Option<&str>) -> GoalOutput {
        self.mutate("updated", key, |vault, id| {
            vault.update_goal(id, title, description).map(|_| ())
        })
    }

    pub fn archive(&self, key: &str) -> GoalOutput {
        self.mutate("archived", key, |vault, id| vault.archive_goal(id).map(|_| ()))
    }

    pub fn unarchive(&self, key: &str) -> GoalOutput {
        self.mutate("unarchived", key, |vault, id| {
            vault.unarchive_goal(id).map(|_| ())
        })
    }

    /// Delete a goal together with its stages.
    pub fn delete(&self, key: &str) -> GoalOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_goal(key)?.id.clone();
            let removed = vault.goal_with_stages(&id);
            vault.delete_goal(&id)?;
            Ok(removed.into_iter().collect())
        });
        match result {
            Ok(goals) => GoalOutput::success("deleted", goals),
            Err(e) => GoalOutput::failure(e.to_string()),
        }
    }

    fn mutate(
        &self,
        action: &str,
        key: &str,
        f: impl FnOnce(&mut Vault, &str) -> Result<()>,
    ) -> GoalOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let id = vault.resolve_goal(key)?.id.clone();
            f(vault, &id)?;
            vault
                .goal_with_stages(&id)
                .map(|g| vec![g])
                .ok_or_else(|| VaultError::not_found("goal", id))
        });
        match result {
            Ok(goals) => GoalOutput::success(action, goals),
            Err(e) => GoalOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &GoalOutput, options: &OutputOptions) -> String {
        render(output, options, format_human_readable)
    }
}

fn format_human_readable(output: &GoalOutput) -> String {
    if !output.success {
        return failure_text("Goal command", output.error.as_deref());
    }
    if output.action == "listed" && output.goals.is_empty() {
        return "No goals.\n".to_string();
    }

    let mut text = String::new();
    if output.action != "listed" && output.action != "shown" {
        text.push_str(&format!("Goal {}.\n", output.action));
    }
    for g in &output.goals {
        text.push_str(&format!(
            "{}  [{}]  {:.0}% ({}/{} stages done)\n",
            g.goal.title,
            g.goal.id,
            g.progress() * 100.0,
            g.completed_stages(),
            g.stages.len()
        ));
        if !g.goal.description.is_empty() {
            text.push_str(&format!("  {}\n", g.goal.description));
        }
        for s in &g.stages {
            text.push_str(&format!(
                "  - {}: {}/{} {}  [{}]\n",
                s.name, s.current_count, s.target_count, s.unit, s.id
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

    fn setup() -> (Arc<MemoryVaultStore>, GoalCommand<Arc<MemoryVaultStore>>) {
        let store = Arc::new(MemoryVaultStore::new());
        let cmd = GoalCommand::new(Arc::clone(&store), Config::default());
        (store, cmd)
    }

    #[test]
    fn test_create_and_list() {
        let (_store, cmd) = setup();

        let created = cmd.create("Airflare", "Land five in a row");
        assert!(created.success);

        let listed = cmd.list(false);
        assert_eq!(listed.goals.len(), 1);
        assert_eq!(listed.goals[0].goal.title, "Airflare");
        assert!(cmd.list(true).goals.is_empty());
    }

    #[test]
    fn test_create_blank_title_fails() {
        let (_store, cmd) = setup();
        let output = cmd.create("  ", "");
        assert!(!output.success);
        assert!(output.error.unwrap().contains("cannot be blank"));
    }

    #[test]
    fn test_archive_cycle() {
        let (_store, cmd) = setup();
        cmd.create("Airflare", "");

        assert!(cmd.archive("airflare").goals[0].goal.is_archived);
        assert_eq!(cmd.list(true).goals.len(), 1);

        assert!(!cmd.unarchive("Airflare").goals[0].goal.is_archived);
        assert_eq!(cmd.list(false).goals.len(), 1);
    }

    #[test]
    fn test_edit_and_delete() {
        let (store, cmd) = setup();
        cmd.create("Airflare", "");

        let edited = cmd.edit("Airflare", None, Some("Clean ones"));
        assert_eq!(edited.goals[0].goal.description, "Clean ones");

        assert!(cmd.delete("Airflare").success);
        let vault = store.load().unwrap().unwrap();
        assert!(vault.active_goals().is_empty());
    }

    #[test]
    fn test_format_progress() {
        let (store, cmd) = setup();
        let created = cmd.create("Airflare", "");
        let goal_id = created.goals[0].goal.id.clone();
        store
            .update(|v| v.add_goal_stage(&goal_id, "Drill", 4, "reps").map(|_| ()))
            .unwrap();

        let output = cmd.show("Airflare");
        let formatted = cmd.format_output(&output, &OutputOptions::default());

        assert!(formatted.contains("0% (0/1 stages done)"));
        assert!(formatted.contains("- Drill: 0/4 reps"));
    }
}
