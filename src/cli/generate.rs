//! Generate command for BreakVault.
//!
//! Produces random or structured combos, or a single flashcard move, and can
//! save a generated combo by name.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::moves::resolve_tag_ids;
use super::{failure_text, read_vault, render, write_vault, OutputOptions};
use crate::config::Config;
use crate::core::generator::{self, ComboRequest, GeneratedCombo, GeneratorSettings};
use crate::core::{GenerationMode, Move, SavedCombo};
use crate::error::Result;
use crate::storage::VaultStore;
use crate::vault::Vault;

/// Output format for the generate command.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutput {
    /// Whether generation succeeded.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<GenerationMode>,
    /// Generated move names in order.
    pub combo: Vec<String>,
    /// Display text, e.g. `Windmill  ->  Flare`.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// The saved combo, when saving was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<SavedCombo>,
    /// Error message if generation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateOutput {
    fn from_combo(combo: &GeneratedCombo, saved: Option<SavedCombo>) -> Self {
        Self {
            success: true,
            mode: Some(combo.mode),
            combo: combo.move_names(),
            text: combo.text(),
            warning: combo.warning.clone(),
            saved,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            mode: None,
            combo: Vec::new(),
            text: String::new(),
            warning: None,
            saved: None,
            error: Some(error.into()),
        }
    }
}

/// Output format for the flashcard subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct FlashcardOutput {
    pub success: bool,
    /// The drawn move; absent when nothing matched.
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub mv: Option<Move>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The generate command implementation.
pub struct GenerateCommand<S: VaultStore> {
    store: S,
    config: Config,
    seed: Option<u64>,
}

impl<S: VaultStore> GenerateCommand<S> {
    /// Create a new generate command.
    pub fn new(store: S, config: Config) -> Self {
        Self {
            store,
            config,
            seed: None,
        }
    }

    /// Use a fixed random seed for reproducible combos.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn settings(&self) -> GeneratorSettings {
        GeneratorSettings::from(&self.config.generator)
    }

    /// Random combo from the moves carrying any of `tags` (all tags when empty).
    pub fn random(
        &self,
        tags: &[String],
        length: Option<usize>,
        allow_repeats: bool,
        save_as: Option<&str>,
    ) -> GenerateOutput {
        self.run(save_as, |vault| {
            Ok(ComboRequest::Random {
                tag_ids: resolve_tag_ids(vault, tags)?,
                length,
                allow_repeats,
            })
        })
    }

    /// One random move per tag in `sequence`, in order.
    pub fn structured(&self, sequence: &[String], save_as: Option<&str>) -> GenerateOutput {
        self.run(save_as, |vault| {
            Ok(ComboRequest::Structured {
                sequence: resolve_tag_ids(vault, sequence)?,
            })
        })
    }

    fn run(
        &self,
        save_as: Option<&str>,
        request: impl FnOnce(&Vault) -> Result<ComboRequest>,
    ) -> GenerateOutput {
        let result = read_vault(&self.store, &self.config).and_then(|vault| {
            let request = request(&vault)?;
            let combo = generator::generate(&vault, &request, &self.settings(), &mut self.rng())?;

            let saved = match save_as {
                Some(name) => {
                    let names = combo.move_names();
                    Some(write_vault(&self.store, &self.config, |v| {
                        v.save_combo(name, names)
                    })?)
                }
                None => None,
            };
            Ok(GenerateOutput::from_combo(&combo, saved))
        });
        result.unwrap_or_else(|e| GenerateOutput::failure(e.to_string()))
    }

    /// Draw one random move carrying any of `tags`.
    pub fn flashcard(&self, tags: &[String]) -> FlashcardOutput {
        let result = read_vault(&self.store, &self.config).and_then(|vault| {
            let tag_ids = resolve_tag_ids(&vault, tags)?;
            Ok(generator::flashcard(&vault, &tag_ids, &mut self.rng()))
        });
        match result {
            Ok(mv) => FlashcardOutput {
                success: true,
                mv,
                error: None,
            },
            Err(e) => FlashcardOutput {
                success: false,
                mv: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &GenerateOutput, options: &OutputOptions) -> String {
        render(output, options, |output| {
            if !output.success {
                return failure_text("Generation", output.error.as_deref());
            }
            let mut text = format!("{}\n", output.text);
            if let Some(warning) = &output.warning {
                text.push_str(&format!("Note: {}\n", warning));
            }
            if let Some(saved) = &output.saved {
                text.push_str(&format!("Saved as \"{}\" [{}]\n", saved.name, saved.id));
            }
            text
        })
    }

    pub fn format_flashcard(&self, output: &FlashcardOutput, options: &OutputOptions) -> String {
        render(output, options, |output| match (&output.mv, &output.error) {
            (_, Some(error)) => failure_text("Flashcard", Some(error.as_str())),
            (Some(mv), None) => format!("{}\n", mv.name),
            (None, None) => "No moves found for the selected tags.\n".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryVaultStore;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryVaultStore>, GenerateCommand<Arc<MemoryVaultStore>>) {
        let store = Arc::new(MemoryVaultStore::new());
        let cmd = GenerateCommand::new(Arc::clone(&store), Config::default()).with_seed(Some(7));
        (store, cmd)
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_random_from_one_tag() {
        let (_store, cmd) = setup();

        let output = cmd.random(&tags(&["Power"]), Some(2), false, None);

        assert!(output.success);
        assert_eq!(output.mode, Some(GenerationMode::Random));
        assert_eq!(output.combo.len(), 2);
        assert!(output
            .combo
            .iter()
            .all(|m| m == "Windmill" || m == "Backspin"));
        assert!(output.text.contains("  ->  "));
        assert!(output.warning.is_none());
    }

    #[test]
    fn test_random_short_pool_warns() {
        let (_store, cmd) = setup();

        let output = cmd.random(&tags(&["Freeze"]), Some(3), false, None);

        assert!(output.success);
        assert_eq!(output.combo, vec!["Baby Freeze"]);
        assert!(output.warning.unwrap().starts_with("Only 1 moves are available"));
    }

    #[test]
    fn test_same_seed_same_combo() {
        let (_store, cmd) = setup();

        let a = cmd.random(&[], None, true, None);
        let b = cmd.random(&[], None, true, None);

        assert_eq!(a.combo, b.combo);
    }

    #[test]
    fn test_structured_and_save() {
        let (store, cmd) = setup();

        let output = cmd.structured(&tags(&["Toprock", "Footwork", "Power"]), Some("Round One"));

        assert!(output.success);
        assert_eq!(output.combo[0], "Toprock Basic");
        let saved = output.saved.unwrap();
        assert_eq!(saved.name, "Round One");
        assert_eq!(saved.moves, output.combo);

        let vault = store.load().unwrap().unwrap();
        assert!(vault.saved_combo(&saved.id).is_some());
    }

    #[test]
    fn test_structured_unknown_tag_fails() {
        let (_store, cmd) = setup();

        let output = cmd.structured(&tags(&["Tricks"]), None);

        assert!(!output.success);
    }

    #[test]
    fn test_generate_with_empty_vault() {
        let store = Arc::new(MemoryVaultStore::new());
        let mut config = Config::default();
        config.seed.example_data = false;
        let cmd = GenerateCommand::new(store, config);

        let output = cmd.random(&[], None, false, None);

        assert!(!output.success);
        assert_eq!(
            output.error.as_deref(),
            Some("No tags available to generate a combo.")
        );
    }

    #[test]
    fn test_flashcard() {
        let (_store, cmd) = setup();

        let output = cmd.flashcard(&tags(&["Freeze"]));
        assert_eq!(output.mv.unwrap().name, "Baby Freeze");

        let none = cmd.flashcard(&[]);
        assert!(none.success);
        assert!(none.mv.is_none());
        let text = cmd.format_flashcard(&none, &OutputOptions::default());
        assert!(text.contains("No moves found"));
    }

    #[test]
    fn test_format_output_with_warning_and_save() {
        let (_store, cmd) = setup();
        let output = cmd.random(&tags(&["Freeze"]), Some(2), false, Some(""));

        let formatted = cmd.format_output(&output, &OutputOptions::default());

        assert!(formatted.starts_with("Baby Freeze\n"));
        assert!(formatted.contains("Note: Only 1 moves"));
        assert!(formatted.contains("Saved as \"Combo "));
    }
}
