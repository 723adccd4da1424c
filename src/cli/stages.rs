//! Stage command for BreakVault.
//!
//! Adds, edits and deletes goal stages and records progress against them.

use serde::Serialize;

use super::{failure_text, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::core::{GoalStage, GoalWithStages};
use crate::error::Result;
use crate::storage::VaultStore;
use crate::vault::{GoalStageUpdate, Vault};

/// Output format for the stage command.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<GoalStage>,
    /// The owning goal after the change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalWithStages>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageOutput {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: String::new(),
            stage: None,
            goal: None,
            error: Some(error.into()),
        }
    }
}

/// The stage command implementation.
pub struct StageCommand<S: VaultStore> {
    store: S,
    config: Config,
}

impl<S: VaultStore> StageCommand<S> {
    /// Create a new stage command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// Add a stage to a goal. `unit` falls back to the configured default.
    pub fn add(&self, goal_key: &str, name: &str, target: u32, unit: Option<&str>) -> StageOutput {
        let unit = unit.unwrap_or(&self.config.goals.default_unit);
        self.run("added", |vault| {
            let goal_id = vault.resolve_goal(goal_key)?.id.clone();
            vault.add_goal_stage(&goal_id, name, target, unit)
        })
    }

    pub fn edit(&self, key: &str, update: GoalStageUpdate) -> StageOutput {
        self.run("updated", |vault| {
            let id = vault.resolve_goal_stage(key)?.id.clone();
            vault.update_goal_stage(&id, update)
        })
    }

    /// Add `amount` to a stage's count. Negative amounts undo progress.
    pub fn progress(&self, key: &str, amount: i64) -> StageOutput {
        self.run("progressed", |vault| {
            let id = vault.resolve_goal_stage(key)?.id.clone();
            vault.increment_stage_progress(&id, amount)
        })
    }

    pub fn delete(&self, key: &str) -> StageOutput {
        self.run("deleted", |vault| {
            let id = vault.resolve_goal_stage(key)?.id.clone();
            vault.delete_goal_stage(&id)
        })
    }

    fn run(&self, action: &str, f: impl FnOnce(&mut Vault) -> Result<GoalStage>) -> StageOutput {
        let result = write_vault(&self.store, &self.config, |vault| {
            let stage = f(vault)?;
            let goal = vault.goal_with_stages(&stage.goal_id);
            Ok((stage, goal))
        });
        match result {
            Ok((stage, goal)) => StageOutput {
                success: true,
                action: action.to_string(),
                stage: Some(stage),
                goal,
                error: None,
            },
            Err(e) => StageOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StageOutput, options: &OutputOptions) -> String {
        render(output, options, |output| {
            if !output.success {
                return failure_text("Stage command", output.error.as_deref());
            }
            let Some(stage) = &output.stage else {
                return String::new();
            };
            let mut text = format!(
                "Stage {}: {} {}/{} {}  [{}]\n",
                output.action,
                stage.name,
                stage.current_count,
                stage.target_count,
                stage.unit,
                stage.id
            );
            if stage.is_complete() && output.action == "progressed" {
                text.push_str("Stage complete!\n");
            }
            if let Some(goal) = &output.goal {
                text.push_str(&format!(
                    "{}: {:.0}% overall\n",
                    goal.goal.title,
                    goal.progress() * 100.0
                ));
            }
            text
        })
    }
}
