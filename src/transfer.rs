//! JSON export and import of the whole vault.
//!
//! The export document is a flat set of tables:
//!
//! ```json
//! {
//!   "formatVersion": 1,
//!   "moves": [{"id": "m1", "name": "Windmill", "createdAt": 1700000000000, ...}],
//!   "moveTags": [{"id": "t1", "name": "Power", ...}],
//!   "moveTagCrossRefs": [{"moveId": "m1", "tagId": "t1"}],
//!   "savedCombos": [...],
//!   "battleCombos": [...],
//!   "battleTags": [...],
//!   "battleComboTagCrossRefs": [...],
//!   "goals": [...],
//!   "goalStages": [...]
//! }
//! ```
//!
//! Older files used `tags` for the move tag list; that key is still accepted.
//! Every list except `moves` may be missing, and unknown keys are ignored.
//!
//! Import is all-or-nothing: every cross-reference is checked against the
//! incoming data before the vault is replaced.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{
    BattleCombo, BattleComboTagLink, BattleTag, Goal, GoalStage, Move, MoveTag, MoveTagLink,
    SavedCombo,
};
use crate::error::{Result, VaultError};
use crate::seed::{self, SeedReport};
use crate::util::{atomic_write, read_to_string_limited};
use crate::vault::{same_name, Vault, VaultCounts};

/// Export format version written by this build.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    EXPORT_FORMAT_VERSION
}

/// A full snapshot of the vault in export form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppDataExport {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub moves: Vec<Move>,
    #[serde(default, alias = "tags")]
    pub move_tags: Vec<MoveTag>,
    #[serde(default)]
    pub move_tag_cross_refs: Vec<MoveTagLink>,
    #[serde(default)]
    pub saved_combos: Vec<SavedCombo>,
    #[serde(default)]
    pub battle_combos: Vec<BattleCombo>,
    #[serde(default)]
    pub battle_tags: Vec<BattleTag>,
    #[serde(default)]
    pub battle_combo_tag_cross_refs: Vec<BattleComboTagLink>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub goal_stages: Vec<GoalStage>,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Rows in the vault right after the data was loaded.
    pub imported: VaultCounts,
    /// Example data added afterwards.
    pub seeded: SeedReport,
}

/// Snapshot every table.
pub fn export(vault: &Vault) -> AppDataExport {
    AppDataExport {
        format_version: EXPORT_FORMAT_VERSION,
        moves: vault.moves.clone(),
        move_tags: vault.move_tags.clone(),
        move_tag_cross_refs: vault.move_tag_links.clone(),
        saved_combos: vault.saved_combos.clone(),
        battle_combos: vault.battle_combos.clone(),
        battle_tags: vault.battle_tags.clone(),
        battle_combo_tag_cross_refs: vault.battle_combo_tag_links.clone(),
        goals: vault.goals.clone(),
        goal_stages: vault.goal_stages.clone(),
    }
}

/// Replace the vault's contents with `data`.
///
/// When `seed_examples` is set the example data is ensured afterwards.
/// On any error the vault is left untouched.
pub fn import(vault: &mut Vault, data: AppDataExport, seed_examples: bool) -> Result<ImportReport> {
    if data.format_version > EXPORT_FORMAT_VERSION {
        return Err(VaultError::transfer(format!(
            "export format {} is newer than the supported format {}",
            data.format_version, EXPORT_FORMAT_VERSION
        )));
    }

    let mut incoming = build_vault(data)?;
    incoming.check_integrity()?;
    let imported = incoming.counts();

    let seeded = if seed_examples {
        seed::prepopulate(&mut incoming)?
    } else {
        SeedReport::default()
    };

    *vault = incoming;
    tracing::info!(
        moves = imported.moves,
        move_tags = imported.move_tags,
        saved_combos = imported.saved_combos,
        battle_combos = imported.battle_combos,
        goals = imported.goals,
        "imported vault data"
    );
    Ok(ImportReport { imported, seeded })
}

/// Parse an export document.
pub fn parse_export(json: &str) -> Result<AppDataExport> {
    serde_json::from_str(json).map_err(|e| VaultError::transfer(format!("invalid export file: {}", e)))
}

/// Read and parse an export file.
pub fn read_export(path: &Path) -> Result<AppDataExport> {
    let content = read_to_string_limited(path)?;
    parse_export(&content)
}

/// Write an export document atomically as pretty JSON.
pub fn write_export(path: &Path, data: &AppDataExport) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    atomic_write(path, &json)?;
    tracing::info!(path = %path.display(), bytes = json.len(), "wrote export");
    Ok(())
}

/// Build a vault from raw tables. Later rows replace earlier rows with the same id.
fn build_vault(data: AppDataExport) -> Result<Vault> {
    let mut vault = Vault::new();

    vault.moves = dedupe_by_id(data.moves, |m| m.id.clone());
    vault.move_tags = dedupe_by_id(data.move_tags, |t| t.id.clone());
    check_unique_names(&vault.move_tags, |t| (&t.id, &t.name))?;

    vault.move_tag_links = dedupe_by_id(data.move_tag_cross_refs, |l| {
        (l.move_id.clone(), l.tag_id.clone())
    });
    vault.saved_combos = dedupe_by_id(data.saved_combos, |c| c.id.clone());
    vault.battle_combos = dedupe_by_id(data.battle_combos, |c| c.id.clone());
    vault.battle_tags = dedupe_by_id(data.battle_tags, |t| t.id.clone());
    check_unique_names(&vault.battle_tags, |t| (&t.id, &t.name))?;
    vault.battle_combo_tag_links = dedupe_by_id(data.battle_combo_tag_cross_refs, |l| {
        (l.battle_combo_id.clone(), l.battle_tag_id.clone())
    });
    vault.goals = dedupe_by_id(data.goals, |g| g.id.clone());
    vault.goal_stages = dedupe_by_id(data.goal_stages, |s| s.id.clone());
    for stage in &mut vault.goal_stages {
        stage.apply_progress(0);
    }

    Ok(vault)
}

/// Keep the last row for each key, in order of first appearance.
fn dedupe_by_id<T, K, F>(rows: Vec<T>, key_of: F) -> Vec<T>
where
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    let mut seen: HashSet<K> = HashSet::new();
    for row in rows {
        let key = key_of(&row);
        if seen.contains(&key) {
            if let Some(pos) = out.iter().position(|r| key_of(r) == key) {
                out[pos] = row;
            }
        } else {
            seen.insert(key);
            out.push(row);
        }
    }
    out
}

/// Tag names are unique ignoring case, in both tag tables.
fn check_unique_names<T, F>(tags: &[T], id_and_name: F) -> Result<()>
where
    F: Fn(&T) -> (&String, &String),
{
    for (i, tag) in tags.iter().enumerate() {
        let (id, name) = id_and_name(tag);
        if let Some(dup) = tags[i + 1..]
            .iter()
            .find(|t| same_name(id_and_name(t).1, name))
        {
            return Err(VaultError::constraint(format!(
                "tags '{}' and '{}' share the name '{}'",
                id,
                id_and_name(dup).0,
                name
            )));
        }
    }
    Ok(())
}
