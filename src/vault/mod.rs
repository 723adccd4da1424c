//! The relational dataset behind BreakVault.
//!
//! A `Vault` holds every table (moves, tags, cross-references, saved combos,
//! battle data, goals) and is the only place records are mutated. Inserts
//! check that both ends of a cross-reference exist, and deletes cascade to
//! dependent rows, so the dataset never contains dangling links.
//!
//! The operations are grouped by area in the submodules; each one either
//! fully applies or returns an error before touching anything.

mod battle;
mod combos;
mod goals;
mod moves;

pub use battle::BattleComboUpdate;
pub use goals::GoalStageUpdate;

use serde::{Deserialize, Serialize};

use crate::core::{
    BattleCombo, BattleComboTagLink, BattleTag, Goal, GoalStage, Move, MoveTag, MoveTagLink,
    SavedCombo,
};
use crate::error::{Result, VaultError};

/// Schema version written into every vault document.
pub const VAULT_SCHEMA_VERSION: u32 = 1;

/// All user data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Vault {
    pub(crate) schema_version: u32,
    pub(crate) moves: Vec<Move>,
    pub(crate) move_tags: Vec<MoveTag>,
    pub(crate) move_tag_links: Vec<MoveTagLink>,
    pub(crate) saved_combos: Vec<SavedCombo>,
    pub(crate) battle_combos: Vec<BattleCombo>,
    pub(crate) battle_tags: Vec<BattleTag>,
    pub(crate) battle_combo_tag_links: Vec<BattleComboTagLink>,
    pub(crate) goals: Vec<Goal>,
    pub(crate) goal_stages: Vec<GoalStage>,
}

impl Default for Vault {
    fn default() -> Self {
        Self {
            schema_version: VAULT_SCHEMA_VERSION,
            moves: Vec::new(),
            move_tags: Vec::new(),
            move_tag_links: Vec::new(),
            saved_combos: Vec::new(),
            battle_combos: Vec::new(),
            battle_tags: Vec::new(),
            battle_combo_tag_links: Vec::new(),
            goals: Vec::new(),
            goal_stages: Vec::new(),
        }
    }
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultCounts {
    pub moves: usize,
    pub move_tags: usize,
    pub move_tag_links: usize,
    pub saved_combos: usize,
    pub battle_combos: usize,
    pub battle_tags: usize,
    pub battle_combo_tag_links: usize,
    pub goals: usize,
    pub goal_stages: usize,
}

impl Vault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Delete every row in every table.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.counts() == VaultCounts::default()
    }

    pub fn counts(&self) -> VaultCounts {
        VaultCounts {
            moves: self.moves.len(),
            move_tags: self.move_tags.len(),
            move_tag_links: self.move_tag_links.len(),
            saved_combos: self.saved_combos.len(),
            battle_combos: self.battle_combos.len(),
            battle_tags: self.battle_tags.len(),
            battle_combo_tag_links: self.battle_combo_tag_links.len(),
            goals: self.goals.len(),
            goal_stages: self.goal_stages.len(),
        }
    }

    /// Check every cross-reference and foreign key.
    ///
    /// Used after loading a document from disk; in-process mutations keep
    /// these invariants on their own.
    pub fn check_integrity(&self) -> Result<()> {
        for link in &self.move_tag_links {
            if self.move_by_id(&link.move_id).is_none() {
                return Err(VaultError::constraint(format!(
                    "move tag link references missing move '{}'",
                    link.move_id
                )));
            }
            if self.move_tag_by_id(&link.tag_id).is_none() {
                return Err(VaultError::constraint(format!(
                    "move tag link references missing tag '{}'",
                    link.tag_id
                )));
            }
        }

        for link in &self.battle_combo_tag_links {
            if self.battle_combo_by_id(&link.battle_combo_id).is_none() {
                return Err(VaultError::constraint(format!(
                    "battle tag link references missing battle combo '{}'",
                    link.battle_combo_id
                )));
            }
            if self.battle_tag_by_id(&link.battle_tag_id).is_none() {
                return Err(VaultError::constraint(format!(
                    "battle tag link references missing battle tag '{}'",
                    link.battle_tag_id
                )));
            }
        }

        for stage in &self.goal_stages {
            if self.goal_by_id(&stage.goal_id).is_none() {
                return Err(VaultError::constraint(format!(
                    "stage '{}' references missing goal '{}'",
                    stage.id, stage.goal_id
                )));
            }
        }

        Ok(())
    }
}

/// Find a record by exact id, falling back to a case-insensitive name match.
///
/// More than one name match is reported as ambiguous so callers can retry
/// with an id.
pub(crate) fn resolve<'a, T>(
    items: &'a [T],
    kind: &'static str,
    key: &str,
    id_of: impl Fn(&T) -> &str,
    name_of: impl Fn(&T) -> &str,
) -> Result<&'a T> {
    if let Some(found) = items.iter().find(|item| id_of(item) == key) {
        return Ok(found);
    }

    let wanted = key.trim().to_lowercase();
    let matches: Vec<&T> = items
        .iter()
        .filter(|item| name_of(item).trim().to_lowercase() == wanted)
        .collect();

    match matches.len() {
        0 => Err(VaultError::not_found(kind, key)),
        1 => Ok(matches[0]),
        _ => {
            let ids: Vec<&str> = matches.iter().map(|m| id_of(m)).collect();
            Err(VaultError::constraint(format!(
                "'{}' matches {} {}s ({}); use an id",
                key,
                ids.len(),
                kind,
                ids.join(", ")
            )))
        }
    }
}

/// Case-insensitive name equality used for uniqueness checks.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
