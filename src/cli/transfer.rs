//! Export, import and reset commands for BreakVault.

use std::path::Path;

use serde::Serialize;

use super::{failure_text, read_vault, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::seed::{self, SeedReport};
use crate::storage::VaultStore;
use crate::transfer::{self, AppDataExport, ImportReport};
use crate::vault::VaultCounts;

/// Output format for the data commands.
#[derive(Debug, Clone, Serialize)]
pub struct TransferOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub action: String,
    /// File written or read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Row counts of the exported vault.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported: Option<VaultCounts>,
    /// The export document, when no output file was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AppDataExport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported: Option<ImportReport>,
    /// Example data written by `reset`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeded: Option<SeedReport>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferOutput {
    fn success(action: &str) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            path: None,
            exported: None,
            data: None,
            imported: None,
            seeded: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::success("")
        }
    }
}

/// The export/import/reset command implementation.
pub struct TransferCommand<S: VaultStore> {
    store: S,
    config: Config,
}

impl<S: VaultStore> TransferCommand<S> {
    /// Create a new transfer command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// Export the vault to `path`, or into the output when no path is given.
    pub fn export(&self, path: Option<&Path>) -> TransferOutput {
        let result = read_vault(&self.store, &self.config).and_then(|vault| {
            let data = transfer::export(&vault);
            if let Some(path) = path {
                transfer::write_export(path, &data)?;
            }
            Ok((vault.counts(), data))
        });

        match result {
            Ok((counts, data)) => TransferOutput {
                path: path.map(|p| p.display().to_string()),
                exported: Some(counts),
                data: path.is_none().then_some(data),
                ..TransferOutput::success("exported")
            },
            Err(e) => TransferOutput::failure(e.to_string()),
        }
    }

    /// Replace the vault with the contents of an export file.
    ///
    /// The file is parsed and checked before anything is written.
    pub fn import(&self, path: &Path) -> TransferOutput {
        let seed_examples = self.config.seed.example_data;
        let result = transfer::read_export(path).and_then(|data| {
            write_vault(&self.store, &self.config, |vault| {
                transfer::import(vault, data, seed_examples)
            })
        });

        match result {
            Ok(report) => TransferOutput {
                path: Some(path.display().to_string()),
                imported: Some(report),
                ..TransferOutput::success("imported")
            },
            Err(e) => TransferOutput::failure(e.to_string()),
        }
    }

    /// Delete everything, optionally restoring the example data.
    pub fn reset(&self, with_examples: bool) -> TransferOutput {
        match write_vault(&self.store, &self.config, |vault| {
            seed::reset(vault, with_examples)
        }) {
            Ok(report) => TransferOutput {
                seeded: Some(report),
                ..TransferOutput::success("reset")
            },
            Err(e) => TransferOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &TransferOutput, options: &OutputOptions) -> String {
        render(output, options, format_human_readable)
    }
}

fn format_human_readable(output: &TransferOutput) -> String {
    if !output.success {
        return failure_text("Data command", output.error.as_deref());
    }

    match output.action.as_str() {
        "exported" => {
            // Without a file the document itself is the output.
            if let Some(data) = &output.data {
                return serde_json::to_string_pretty(data).map(|s| s + "\n").unwrap_or_default();
            }
            let counts = output.exported.unwrap_or_default();
            format!(
                "Exported {} moves, {} tags, {} saved combos, {} battle combos and {} goals to {}\n",
                counts.moves,
                counts.move_tags,
                counts.saved_combos,
                counts.battle_combos,
                counts.goals,
                output.path.as_deref().unwrap_or("-")
            )
        }
        "imported" => {
            let Some(report) = &output.imported else {
                return String::new();
            };
            let mut text = format!(
                "Imported {} moves, {} tags, {} saved combos, {} battle combos and {} goals from {}\n",
                report.imported.moves,
                report.imported.move_tags,
                report.imported.saved_combos,
                report.imported.battle_combos,
                report.imported.goals,
                output.path.as_deref().unwrap_or("-")
            );
            if report.seeded.total() > 0 {
                text.push_str(&format!("Added {} example rows.\n", report.seeded.total()));
            }
            text
        }
        "reset" => {
            let seeded = output.seeded.unwrap_or_default();
            if seeded.total() > 0 {
                format!("Vault reset. Restored {} example rows.\n", seeded.total())
            } else {
                "Vault reset. All data deleted.\n".to_string()
            }
        }
        _ => String::new(),
    }
}
