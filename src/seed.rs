//! Example data for a fresh vault.
//!
//! Seeding is idempotent: tags are ensured by name, and moves, battle combos
//! and saved combos are only added when their table is empty. Running it on
//! a vault the user has filled changes nothing.

use serde::{Deserialize, Serialize};

use crate::core::{EnergyLevel, TrainingStatus};
use crate::error::{Result, VaultError};
use crate::vault::Vault;

pub const EXAMPLE_MOVE_TAGS: [&str; 4] = ["Toprock", "Footwork", "Freeze", "Power"];

/// Example moves with the tag each one carries.
pub const EXAMPLE_MOVES: [(&str, &str); 6] = [
    ("6-Step", "Footwork"),
    ("CC", "Footwork"),
    ("Windmill", "Power"),
    ("Baby Freeze", "Freeze"),
    ("Toprock Basic", "Toprock"),
    ("Backspin", "Power"),
];

pub const EXAMPLE_BATTLE_TAGS: [&str; 2] = ["Aggressive", "Musicality"];

const EXAMPLE_BATTLE_COMBOS: [(&str, EnergyLevel, TrainingStatus, &str); 4] = [
    (
        "Windmill -> Backspin -> Freeze",
        EnergyLevel::High,
        TrainingStatus::Ready,
        "Aggressive",
    ),
    (
        "Smooth transitions to CC",
        EnergyLevel::Medium,
        TrainingStatus::Ready,
        "Musicality",
    ),
    (
        "Aggressive Toprock to Drop",
        EnergyLevel::High,
        TrainingStatus::Training,
        "Aggressive",
    ),
    (
        "Slow intro to floor",
        EnergyLevel::Low,
        TrainingStatus::Ready,
        "Musicality",
    ),
];

const EXAMPLE_SAVED_COMBOS: [(&str, [&str; 2]); 3] = [
    ("Classic Footwork", ["6-Step", "CC"]),
    ("Power Finisher", ["Windmill", "Baby Freeze"]),
    ("Top to Down", ["Toprock Basic", "Backspin"]),
];

/// What a seeding pass added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub move_tags: usize,
    pub moves: usize,
    pub battle_tags: usize,
    pub battle_combos: usize,
    pub saved_combos: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.move_tags + self.moves + self.battle_tags + self.battle_combos + self.saved_combos
    }
}

/// Add the example data that is missing.
pub fn prepopulate(vault: &mut Vault) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for name in EXAMPLE_MOVE_TAGS {
        if ensure_move_tag(vault, name)? {
            report.move_tags += 1;
        }
    }

    if vault.moves().is_empty() {
        for (name, tag_name) in EXAMPLE_MOVES {
            let tag_id = vault.resolve_move_tag(tag_name)?.id.clone();
            vault.add_move(name, &[tag_id])?;
            report.moves += 1;
        }
    }

    for name in EXAMPLE_BATTLE_TAGS {
        let before = vault.battle_tags().len();
        vault.add_battle_tag(name)?;
        if vault.battle_tags().len() > before {
            report.battle_tags += 1;
        }
    }

    if vault.battle_combos_with_tags().is_empty() {
        for (description, energy, status, tag) in EXAMPLE_BATTLE_COMBOS {
            vault.add_battle_combo(description, energy, status, &[tag.to_string()])?;
            report.battle_combos += 1;
        }
    }

    if vault.saved_combos().is_empty() {
        for (name, moves) in EXAMPLE_SAVED_COMBOS {
            vault.save_combo(name, moves.iter().map(|m| m.to_string()).collect())?;
            report.saved_combos += 1;
        }
    }

    if report.total() > 0 {
        tracing::info!(
            move_tags = report.move_tags,
            moves = report.moves,
            battle_tags = report.battle_tags,
            battle_combos = report.battle_combos,
            saved_combos = report.saved_combos,
            "added example data"
        );
    }
    Ok(report)
}

/// Wipe the vault, then reseed it when `with_examples` is set.
pub fn reset(vault: &mut Vault, with_examples: bool) -> Result<SeedReport> {
    vault.clear();
    tracing::info!("vault cleared");
    if with_examples {
        prepopulate(vault)
    } else {
        Ok(SeedReport::default())
    }
}

/// Returns true when the tag had to be created.
fn ensure_move_tag(vault: &mut Vault, name: &str) -> Result<bool> {
    match vault.resolve_move_tag(name) {
        Ok(_) => Ok(false),
        Err(VaultError::NotFound { .. }) => {
            vault.add_move_tag(name)?;
            Ok(true)
        }
        Err(e) => Err(e),
    }
}
