//! Combo generation.
//!
//! Two modes:
//!
//! - **Random**: sample moves from every move carrying any of the selected
//!   tags (or all tags when none are selected), with or without repeats.
//! - **Structured**: the user lays out a sequence of tags and gets one random
//!   move per tag, in order.
//!
//! Randomness is injected so callers (and tests) control the source.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::Move;
use crate::config::GeneratorConfig;
use crate::error::{Result, VaultError};
use crate::vault::Vault;

/// Separator placed between move names in a displayed combo.
pub const COMBO_SEPARATOR: &str = "  ->  ";

const NO_TAGS: &str = "No tags available to generate a combo.";
const NO_MOVES: &str = "No moves found matching the selected tags. Add some moves.";
const EMPTY_SEQUENCE: &str = "Please select at least one tag to generate a combo.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Random,
    Structured,
}

/// Length bounds for random combos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

impl From<&GeneratorConfig> for GeneratorSettings {
    fn from(config: &GeneratorConfig) -> Self {
        let min_length = config.min_length.max(1);
        Self {
            min_length,
            max_length: config.max_length.max(min_length),
        }
    }
}

impl GeneratorSettings {
    fn clamp(&self, length: usize) -> usize {
        length.clamp(self.min_length, self.max_length)
    }
}

/// What to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboRequest {
    Random {
        /// Tags to draw from; empty means every tag.
        tag_ids: Vec<String>,
        /// Requested length; a random length in bounds when `None`.
        length: Option<usize>,
        allow_repeats: bool,
    },
    Structured {
        /// One move is drawn per entry; tags may repeat.
        sequence: Vec<String>,
    },
}

impl ComboRequest {
    pub fn mode(&self) -> GenerationMode {
        match self {
            ComboRequest::Random { .. } => GenerationMode::Random,
            ComboRequest::Structured { .. } => GenerationMode::Structured,
        }
    }
}

/// A freshly generated combo. Not persisted until saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCombo {
    pub mode: GenerationMode,
    pub moves: Vec<Move>,
    /// Length the generator aimed for before the pool limited it.
    pub requested_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl GeneratedCombo {
    pub fn move_names(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.name.clone()).collect()
    }

    /// Display text, e.g. `Windmill  ->  Flare`.
    pub fn text(&self) -> String {
        format_combo(&self.move_names())
    }
}

/// Join move names with the combo separator.
pub fn format_combo<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(COMBO_SEPARATOR)
}

/// Generate a combo from the moves in `vault`.
pub fn generate<R: Rng>(
    vault: &Vault,
    request: &ComboRequest,
    settings: &GeneratorSettings,
    rng: &mut R,
) -> Result<GeneratedCombo> {
    let combo = match request {
        ComboRequest::Random {
            tag_ids,
            length,
            allow_repeats,
        } => generate_random(vault, tag_ids, *length, *allow_repeats, settings, rng)?,
        ComboRequest::Structured { sequence } => generate_structured(vault, sequence, rng)?,
    };

    tracing::debug!(
        mode = ?combo.mode,
        requested = combo.requested_length,
        produced = combo.moves.len(),
        "generated combo"
    );
    Ok(combo)
}

/// Pick one random move carrying any of `tag_ids`.
pub fn flashcard<R: Rng>(vault: &Vault, tag_ids: &[String], rng: &mut R) -> Option<Move> {
    if tag_ids.is_empty() {
        return None;
    }
    move_pool(vault, tag_ids).choose(rng).cloned()
}

fn generate_random<R: Rng>(
    vault: &Vault,
    tag_ids: &[String],
    length: Option<usize>,
    allow_repeats: bool,
    settings: &GeneratorSettings,
    rng: &mut R,
) -> Result<GeneratedCombo> {
    let tags_in_use: Vec<String> = if tag_ids.is_empty() {
        vault.move_tags.iter().map(|t| t.id.clone()).collect()
    } else {
        tag_ids.to_vec()
    };
    if tags_in_use.is_empty() {
        return Err(VaultError::generation(NO_TAGS));
    }

    let mut pool = move_pool(vault, &tags_in_use);
    if pool.is_empty() {
        return Err(VaultError::generation(NO_MOVES));
    }

    let target = match length {
        Some(requested) => settings.clamp(requested),
        None => rng.gen_range(settings.min_length..=settings.max_length),
    };

    let moves: Vec<Move> = if allow_repeats {
        (0..target)
            .filter_map(|_| pool.choose(rng).cloned())
            .collect()
    } else {
        pool.shuffle(rng);
        pool.truncate(target);
        pool
    };

    // Only an explicit length can fall short; a drawn length just shrinks.
    let warning = (length.is_some() && !allow_repeats && moves.len() < target).then(|| {
        format!(
            "Only {n} moves are available with the selected tags. A combo of {n} moves has been generated.",
            n = moves.len()
        )
    });

    Ok(GeneratedCombo {
        mode: GenerationMode::Random,
        moves,
        requested_length: target,
        warning,
    })
}

fn generate_structured<R: Rng>(
    vault: &Vault,
    sequence: &[String],
    rng: &mut R,
) -> Result<GeneratedCombo> {
    if sequence.is_empty() {
        return Err(VaultError::generation(EMPTY_SEQUENCE));
    }

    let moves: Vec<Move> = sequence
        .iter()
        .filter_map(|tag_id| vault.moves_for_tag(tag_id).choose(rng).cloned())
        .collect();

    if moves.is_empty() {
        return Err(VaultError::generation(NO_MOVES));
    }

    Ok(GeneratedCombo {
        mode: GenerationMode::Structured,
        moves,
        requested_length: sequence.len(),
        warning: None,
    })
}

/// Distinct moves linked to any of `tag_ids`, in vault order.
fn move_pool(vault: &Vault, tag_ids: &[String]) -> Vec<Move> {
    let wanted: HashSet<&str> = tag_ids.iter().map(String::as_str).collect();
    let linked: HashSet<&str> = vault
        .move_tag_links
        .iter()
        .filter(|l| wanted.contains(l.tag_id.as_str()))
        .map(|l| l.move_id.as_str())
        .collect();

    vault
        .moves
        .iter()
        .filter(|m| linked.contains(m.id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    /// Vault with Power (3 moves), Freeze (1 move) and an empty Toprock tag.
    fn sample_vault() -> (Vault, String, String, String) {
        let mut vault = Vault::new();
        let power = vault.add_move_tag("Power").unwrap().id;
        let freeze = vault.add_move_tag("Freeze").unwrap().id;
        let toprock = vault.add_move_tag("Toprock").unwrap().id;
        for name in ["Windmill", "Flare", "Headspin"] {
            vault.add_move(name, &[power.clone()]).unwrap();
        }
        vault.add_move("Baby Freeze", &[freeze.clone()]).unwrap();
        (vault, power, freeze, toprock)
    }

    fn random(tag_ids: Vec<String>, length: Option<usize>, allow_repeats: bool) -> ComboRequest {
        ComboRequest::Random {
            tag_ids,
            length,
            allow_repeats,
        }
    }

    #[test]
    fn test_format_combo() {
        assert_eq!(format_combo(&["Windmill", "Flare"]), "Windmill  ->  Flare");
        assert_eq!(format_combo::<&str>(&[]), "");
    }

    #[test]
    fn test_random_without_tags_in_vault() {
        let vault = Vault::new();
        let err = generate(
            &vault,
            &random(vec![], None, false),
            &GeneratorSettings::default(),
            &mut rng(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), NO_TAGS);
    }

    #[test]
    fn test_random_with_tag_that_has_no_moves() {
        let (vault, _, _, toprock) = sample_vault();
        let err = generate(
            &vault,
            &random(vec![toprock], Some(3), false),
            &GeneratorSettings::default(),
            &mut rng(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), NO_MOVES);
    }

    #[test]
    fn test_random_without_repeats_warns_when_pool_is_short() {
        let (vault, power, _, _) = sample_vault();
        let combo = generate(
            &vault,
            &random(vec![power], Some(5), false),
            &GeneratorSettings::default(),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(combo.moves.len(), 3);
        assert_eq!(combo.requested_length, 5);
        assert_eq!(
            combo.warning.as_deref(),
            Some("Only 3 moves are available with the selected tags. A combo of 3 moves has been generated.")
        );
    }

    #[test]
    fn test_random_without_length_never_warns() {
        let (vault, _, freeze, _) = sample_vault();
        for seed in 0..50 {
            let combo = generate(
                &vault,
                &random(vec![freeze.clone()], None, false),
                &GeneratorSettings::default(),
                &mut ChaCha8Rng::seed_from_u64(seed),
            )
            .unwrap();

            assert_eq!(combo.moves.len(), 1);
            assert!(combo.warning.is_none(), "seed {} warned", seed);
        }
    }

    #[test]
    fn test_random_with_repeats_reaches_requested_length() {
        let (vault, _, freeze, _) = sample_vault();
        let combo = generate(
            &vault,
            &random(vec![freeze], Some(4), true),
            &GeneratorSettings::default(),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(combo.move_names(), vec!["Baby Freeze"; 4]);
        assert!(combo.warning.is_none());
    }

    #[test]
    fn test_random_length_is_clamped() {
        let (vault, _, _, _) = sample_vault();
        let settings = GeneratorSettings {
            min_length: 2,
            max_length: 3,
        };

        let long = generate(&vault, &random(vec![], Some(10), true), &settings, &mut rng()).unwrap();
        assert_eq!(long.moves.len(), 3);

        let short = generate(&vault, &random(vec![], Some(0), true), &settings, &mut rng()).unwrap();
        assert_eq!(short.moves.len(), 2);
    }

    #[test]
    fn test_random_uses_all_tags_when_none_selected() {
        let (vault, _, _, _) = sample_vault();
        let combo = generate(
            &vault,
            &random(vec![], Some(6), false),
            &GeneratorSettings::default(),
            &mut rng(),
        )
        .unwrap();

        // Four distinct moves across Power and Freeze
        assert_eq!(combo.moves.len(), 4);
    }

    #[test]
    fn test_random_is_deterministic_for_a_seed() {
        let (vault, _, _, _) = sample_vault();
        let request = random(vec![], None, true);
        let settings = GeneratorSettings::default();

        let a = generate(&vault, &request, &settings, &mut rng()).unwrap();
        let b = generate(&vault, &request, &settings, &mut rng()).unwrap();

        assert_eq!(a.move_names(), b.move_names());
    }

    #[test]
    fn test_structured_follows_sequence() {
        let (vault, power, freeze, toprock) = sample_vault();
        let request = ComboRequest::Structured {
            sequence: vec![power.clone(), toprock, freeze, power],
        };

        let combo = generate(&vault, &request, &GeneratorSettings::default(), &mut rng()).unwrap();

        // Toprock has no moves and is skipped
        assert_eq!(combo.mode, GenerationMode::Structured);
        assert_eq!(combo.moves.len(), 3);
        assert_eq!(combo.moves[1].name, "Baby Freeze");
        assert_eq!(combo.requested_length, 4);
    }

    #[test]
    fn test_structured_empty_sequence() {
        let (vault, _, _, _) = sample_vault();
        let err = generate(
            &vault,
            &ComboRequest::Structured { sequence: vec![] },
            &GeneratorSettings::default(),
            &mut rng(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), EMPTY_SEQUENCE);
    }

    #[test]
    fn test_structured_nothing_produced() {
        let (vault, _, _, toprock) = sample_vault();
        let err = generate(
            &vault,
            &ComboRequest::Structured {
                sequence: vec![toprock],
            },
            &GeneratorSettings::default(),
            &mut rng(),
        )
        .unwrap_err();

        assert!(matches!(err, VaultError::Generation { .. }));
    }

    #[test]
    fn test_flashcard() {
        let (vault, _, freeze, toprock) = sample_vault();

        let card = flashcard(&vault, &[freeze], &mut rng()).unwrap();
        assert_eq!(card.name, "Baby Freeze");

        assert!(flashcard(&vault, &[], &mut rng()).is_none());
        assert!(flashcard(&vault, &[toprock], &mut rng()).is_none());
    }

    #[test]
    fn test_settings_from_config_are_sane() {
        let settings = GeneratorSettings::from(&GeneratorConfig {
            min_length: 0,
            max_length: 0,
        });
        assert_eq!(settings.min_length, 1);
        assert_eq!(settings.max_length, 1);
    }

    #[test]
    fn test_generated_combo_text() {
        let (vault, _, freeze, _) = sample_vault();
        let combo = generate(
            &vault,
            &random(vec![freeze], Some(2), true),
            &GeneratorSettings::default(),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(combo.text(), "Baby Freeze  ->  Baby Freeze");
    }

    // =========================================================================
    // Property-based tests
    // =========================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: random combos stay within bounds and only use pooled moves
            #[test]
            fn prop_random_length_within_bounds(
                seed in any::<u64>(),
                min in 1usize..4,
                extra in 0usize..4,
                requested in proptest::option::of(0usize..12),
                allow_repeats in any::<bool>(),
            ) {
                let (vault, power, _, _) = sample_vault();
                let settings = GeneratorSettings { min_length: min, max_length: min + extra };
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let combo = generate(
                    &vault,
                    &random(vec![power.clone()], requested, allow_repeats),
                    &settings,
                    &mut rng,
                ).unwrap();

                prop_assert!(combo.requested_length >= settings.min_length);
                prop_assert!(combo.requested_length <= settings.max_length);
                prop_assert!(combo.moves.len() <= combo.requested_length);
                prop_assert!(!combo.moves.is_empty());
                for mv in &combo.moves {
                    prop_assert!(vault.tags_for_move(&mv.id).iter().any(|t| t.id == power));
                }
            }

            // Property: without repeats every move appears at most once
            #[test]
            fn prop_no_repeats_means_distinct(seed in any::<u64>(), requested in 1usize..10) {
                let (vault, _, _, _) = sample_vault();
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let settings = GeneratorSettings { min_length: 1, max_length: 10 };

                let combo = generate(&vault, &random(vec![], Some(requested), false), &settings, &mut rng).unwrap();

                let ids: HashSet<&str> = combo.moves.iter().map(|m| m.id.as_str()).collect();
                prop_assert_eq!(ids.len(), combo.moves.len());
                prop_assert_eq!(combo.warning.is_some(), combo.moves.len() < requested);
            }
        }
    }
}
