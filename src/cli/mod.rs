//! CLI commands for BreakVault.
//!
//! This module provides the CLI commands, organized into:
//! - **Practice commands**: move, tag, generate, combo
//! - **Battle commands**: battle, battle-tag
//! - **Goal commands**: goal, stage
//! - **Data commands**: export, import, reset
//!
//! Every command returns a serializable output with a `success` flag and an
//! optional `error`, rendered as JSON or as text by `format_output`.

// Practice commands
pub mod combos;
pub mod generate;
pub mod moves;
pub mod tags;

// Battle commands
pub mod battle;
pub mod battle_tags;

// Goal commands
pub mod goals;
pub mod stages;

// Data commands
pub mod transfer;

pub use battle::BattleCommand;
pub use battle_tags::BattleTagCommand;
pub use combos::ComboCommand;
pub use generate::GenerateCommand;
pub use goals::GoalCommand;
pub use moves::MoveCommand;
pub use stages::StageCommand;
pub use tags::TagCommand;
pub use transfer::TransferCommand;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::storage::{open_vault, VaultStore};
use crate::vault::Vault;

/// Output options shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Render an output as pretty JSON, or as text via `human`.
pub fn render<T: Serialize>(
    output: &T,
    options: &OutputOptions,
    human: impl FnOnce(&T) -> String,
) -> String {
    if options.quiet {
        return String::new();
    }

    if options.json {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    } else {
        human(output)
    }
}

/// Load the vault for a read-only command.
pub(crate) fn read_vault<S: VaultStore>(store: &S, config: &Config) -> Result<Vault> {
    open_vault(store, config)
}

/// Apply `f` to the vault and save it, or save nothing if `f` fails.
pub(crate) fn write_vault<S, T, F>(store: &S, config: &Config, f: F) -> Result<T>
where
    S: VaultStore,
    F: FnOnce(&mut Vault) -> Result<T>,
{
    open_vault(store, config)?;
    store.update(f)
}

/// Split comma-separated values and drop blanks.
pub fn split_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Text for a failed command.
pub(crate) fn failure_text(what: &str, error: Option<&str>) -> String {
    format!("{} failed: {}\n", what, error.unwrap_or("unknown error"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;
    use crate::storage::MemoryVaultStore;

    #[derive(Serialize)]
    struct Sample {
        success: bool,
    }

    #[test]
    fn test_render_modes() {
        let sample = Sample { success: true };

        let quiet = OutputOptions {
            quiet: true,
            json: true,
        };
        assert!(render(&sample, &quiet, |_| "text".to_string()).is_empty());

        let json = OutputOptions {
            json: true,
            ..Default::default()
        };
        assert!(render(&sample, &json, |_| "text".to_string()).contains("\"success\": true"));

        let text = OutputOptions::default();
        assert_eq!(render(&sample, &text, |_| "text".to_string()), "text");
    }

    #[test]
    fn test_split_list() {
        let values = vec!["Power, Freeze".to_string(), " ".to_string(), "Toprock".to_string()];
        assert_eq!(split_list(&values), vec!["Power", "Freeze", "Toprock"]);
    }

    #[test]
    fn test_write_vault_does_not_save_on_error() {
        let store = MemoryVaultStore::new();
        let mut config = Config::default();
        config.seed.example_data = false;

        let result: Result<()> = write_vault(&store, &config, |v| {
            v.add_move("Flare", &[])?;
            Err(VaultError::validation("nope"))
        });

        assert!(result.is_err());
        assert!(read_vault(&store, &config).unwrap().is_empty());
    }
}
