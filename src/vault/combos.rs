//! Saved combo operations.
//!
//! Saved combos store move names rather than ids, so they outlive the moves
//! they were built from.

use super::{resolve, Vault};
use crate::core::{default_combo_name_now, normalize_name, now, SavedCombo};
use crate::error::{Result, VaultError};

impl Vault {
    pub fn saved_combo(&self, id: &str) -> Option<&SavedCombo> {
        self.saved_combos.iter().find(|c| c.id == id)
    }

    pub fn resolve_saved_combo(&self, key: &str) -> Result<&SavedCombo> {
        resolve(&self.saved_combos, "saved combo", key, |c| &c.id, |c| &c.name)
    }

    /// All saved combos, newest first.
    pub fn saved_combos(&self) -> Vec<SavedCombo> {
        let mut combos = self.saved_combos.clone();
        combos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        combos
    }

    /// Save a combo. A blank name is replaced by a timestamped default.
    pub fn save_combo(&mut self, name: &str, moves: Vec<String>) -> Result<SavedCombo> {
        let moves = clean_moves(moves)?;
        let name = match name.trim() {
            "" => default_combo_name_now(),
            trimmed => trimmed.to_string(),
        };

        let combo = SavedCombo::new(name, moves);
        self.saved_combos.push(combo.clone());

        tracing::debug!(combo_id = %combo.id, name = %combo.name, moves = combo.moves.len(), "saved combo");
        Ok(combo)
    }

    /// Insert a fully built combo, replacing any combo with the same id.
    pub fn insert_saved_combo(&mut self, combo: SavedCombo) {
        match self.saved_combos.iter_mut().find(|c| c.id == combo.id) {
            Some(existing) => *existing = combo,
            None => self.saved_combos.push(combo),
        }
    }

    pub fn rename_saved_combo(&mut self, id: &str, new_name: &str) -> Result<SavedCombo> {
        self.update_saved_combo(id, Some(new_name), None)
    }

    /// Change the name and/or the move list of a saved combo.
    pub fn update_saved_combo(
        &mut self,
        id: &str,
        new_name: Option<&str>,
        new_moves: Option<Vec<String>>,
    ) -> Result<SavedCombo> {
        let name = new_name
            .map(|n| normalize_name("combo name", n))
            .transpose()?;
        let moves = new_moves.map(clean_moves).transpose()?;

        let combo = self
            .saved_combos
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| VaultError::not_found("saved combo", id))?;

        if let Some(name) = name {
            combo.name = name;
        }
        if let Some(moves) = moves {
            combo.moves = moves;
        }
        combo.modified_at = now();

        Ok(combo.clone())
    }

    pub fn delete_saved_combo(&mut self, id: &str) -> Result<SavedCombo> {
        let index = self
            .saved_combos
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| VaultError::not_found("saved combo", id))?;
        Ok(self.saved_combos.remove(index))
    }
}

fn clean_moves(moves: Vec<String>) -> Result<Vec<String>> {
    let moves: Vec<String> = moves
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    if moves.is_empty() {
        return Err(VaultError::validation("a combo needs at least one move"));
    }
    Ok(moves)
}
