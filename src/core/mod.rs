//! Core record types and combo generation for BreakVault.
//!
//! The record types mirror the tables of the vault: moves and move tags,
//! saved combos, battle combos and battle tags, goals and goal stages.
//! Everything serializes to camelCase JSON with epoch-millisecond
//! timestamps so the vault document and export files share one format.

pub mod battle;
pub mod generator;
pub mod goal;
pub mod moves;
pub mod saved_combo;

pub use battle::{
    BattleCombo, BattleComboTagLink, BattleComboWithTags, BattleTag, EnergyLevel, TrainingStatus,
};
pub use generator::{
    format_combo, ComboRequest, GeneratedCombo, GenerationMode, GeneratorSettings,
    COMBO_SEPARATOR,
};
pub use goal::{
    Goal, GoalStage, GoalWithStages, GOAL_TITLE_MAX_CHARS, STAGE_NAME_MAX_CHARS,
    STAGE_UNIT_MAX_CHARS,
};
pub use moves::{Move, MoveTag, MoveTagLink, MoveWithTags, TagWithMoves};
pub use saved_combo::{default_combo_name, default_combo_name_now, SavedCombo};

use chrono::{DateTime, Utc};

use crate::error::{Result, VaultError};

/// Generate a fresh record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time truncated to whole milliseconds.
///
/// Timestamps are stored as epoch milliseconds, so records built from this
/// compare equal after a save/load cycle.
pub fn now() -> DateTime<Utc> {
    let current = Utc::now();
    DateTime::from_timestamp_millis(current.timestamp_millis()).unwrap_or(current)
}

/// Trim a user-supplied name and reject blank values.
pub fn normalize_name(kind: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(VaultError::validation(format!("{} cannot be blank", kind)));
    }
    Ok(trimmed.to_string())
}

/// Reject values longer than `max_chars` characters.
pub fn check_max_chars(kind: &str, value: &str, max_chars: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max_chars {
        return Err(VaultError::validation(format!(
            "{} must be at most {} characters (got {})",
            kind, max_chars, len
        )));
    }
    Ok(())
}
