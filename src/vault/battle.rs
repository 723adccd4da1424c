//! Battle combo and battle tag operations.

use super::{resolve, same_name, Vault};
use crate::core::{
    normalize_name, now, BattleCombo, BattleComboTagLink, BattleComboWithTags, BattleTag,
    EnergyLevel, TrainingStatus,
};
use crate::error::{Result, VaultError};

/// Partial update for a battle combo. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BattleComboUpdate {
    pub description: Option<String>,
    pub energy: Option<EnergyLevel>,
    pub status: Option<TrainingStatus>,
    /// Replaces every tag; unknown names are created.
    pub tag_names: Option<Vec<String>>,
}

impl Vault {
    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn battle_combo_by_id(&self, id: &str) -> Option<&BattleCombo> {
        self.battle_combos.iter().find(|c| c.id == id)
    }

    pub fn battle_tag_by_id(&self, id: &str) -> Option<&BattleTag> {
        self.battle_tags.iter().find(|t| t.id == id)
    }

    /// Look a battle combo up by id or description.
    pub fn resolve_battle_combo(&self, key: &str) -> Result<&BattleCombo> {
        resolve(
            &self.battle_combos,
            "battle combo",
            key,
            |c| &c.id,
            |c| &c.description,
        )
    }

    pub fn resolve_battle_tag(&self, key: &str) -> Result<&BattleTag> {
        resolve(&self.battle_tags, "battle tag", key, |t| &t.id, |t| &t.name)
    }

    /// All battle tags ordered by name.
    pub fn battle_tags(&self) -> Vec<BattleTag> {
        let mut tags = self.battle_tags.clone();
        tags.sort_by_key(|t| t.name.to_lowercase());
        tags
    }

    pub fn battle_combo_with_tags(&self, id: &str) -> Option<BattleComboWithTags> {
        self.battle_combo_by_id(id).map(|combo| self.with_battle_tags(combo))
    }

    /// Every battle combo with its tags, ordered by energy then creation time.
    pub fn battle_combos_with_tags(&self) -> Vec<BattleComboWithTags> {
        let mut combos: Vec<BattleComboWithTags> = self
            .battle_combos
            .iter()
            .map(|combo| self.with_battle_tags(combo))
            .collect();
        combos.sort_by(|a, b| {
            a.combo
                .energy
                .cmp(&b.combo.energy)
                .then(a.combo.created_at.cmp(&b.combo.created_at))
        });
        combos
    }

    fn with_battle_tags(&self, combo: &BattleCombo) -> BattleComboWithTags {
        let mut tags: Vec<BattleTag> = self
            .battle_combo_tag_links
            .iter()
            .filter(|l| l.battle_combo_id == combo.id)
            .filter_map(|l| self.battle_tag_by_id(&l.battle_tag_id).cloned())
            .collect();
        tags.sort_by_key(|t| t.name.to_lowercase());
        BattleComboWithTags {
            combo: combo.clone(),
            tags,
        }
    }

    // -------------------------------------------------------------------------
    // Battle combos
    // -------------------------------------------------------------------------

    /// Create a battle combo, creating any tag names that do not exist yet.
    pub fn add_battle_combo(
        &mut self,
        description: &str,
        energy: EnergyLevel,
        status: TrainingStatus,
        tag_names: &[String],
    ) -> Result<BattleCombo> {
        let description = normalize_name("description", description)?;
        let tag_names = clean_tag_names(tag_names)?;

        let combo = BattleCombo::new(description, energy, status);
        self.battle_combos.push(combo.clone());
        for name in &tag_names {
            let tag_id = self.ensure_battle_tag(name);
            self.push_battle_link(&combo.id, &tag_id);
        }

        tracing::debug!(combo_id = %combo.id, energy = %combo.energy, tags = tag_names.len(), "added battle combo");
        Ok(combo)
    }

    /// Insert a fully built battle combo, replacing any with the same id.
    pub fn insert_battle_combo(&mut self, combo: BattleCombo) {
        match self.battle_combos.iter_mut().find(|c| c.id == combo.id) {
            Some(existing) => *existing = combo,
            None => self.battle_combos.push(combo),
        }
    }

    pub fn update_battle_combo(
        &mut self,
        id: &str,
        update: BattleComboUpdate,
    ) -> Result<BattleCombo> {
        let description = update
            .description
            .as_deref()
            .map(|d| normalize_name("description", d))
            .transpose()?;
        let tag_names = update
            .tag_names
            .as_deref()
            .map(clean_tag_names)
            .transpose()?;

        let combo = self
            .battle_combos
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| VaultError::not_found("battle combo", id))?;

        if let Some(description) = description {
            combo.description = description;
        }
        if let Some(energy) = update.energy {
            combo.energy = energy;
        }
        if let Some(status) = update.status {
            combo.status = status;
        }
        combo.modified_at = now();
        let updated = combo.clone();

        if let Some(tag_names) = tag_names {
            self.battle_combo_tag_links
                .retain(|l| l.battle_combo_id != id);
            for name in &tag_names {
                let tag_id = self.ensure_battle_tag(name);
                self.push_battle_link(id, &tag_id);
            }
        }

        Ok(updated)
    }

    /// Flip the used flag. Returns the new value.
    pub fn toggle_battle_combo_used(&mut self, id: &str) -> Result<bool> {
        let combo = self
            .battle_combos
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| VaultError::not_found("battle combo", id))?;
        combo.is_used = !combo.is_used;
        Ok(combo.is_used)
    }

    /// Clear the used flag on every combo. Returns how many were reset.
    pub fn reset_battle(&mut self) -> usize {
        let mut reset = 0;
        for combo in self.battle_combos.iter_mut().filter(|c| c.is_used) {
            combo.is_used = false;
            reset += 1;
        }
        tracing::debug!(reset, "reset battle");
        reset
    }

    pub fn delete_battle_combo(&mut self, id: &str) -> Result<BattleCombo> {
        let index = self
            .battle_combos
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| VaultError::not_found("battle combo", id))?;
        self.battle_combo_tag_links
            .retain(|l| l.battle_combo_id != id);
        Ok(self.battle_combos.remove(index))
    }

    // -------------------------------------------------------------------------
    // Battle tags
    // -------------------------------------------------------------------------

    /// Create a battle tag, or return the existing one with that name.
    pub fn add_battle_tag(&mut self, name: &str) -> Result<BattleTag> {
        let name = normalize_name("battle tag name", name)?;
        let id = self.ensure_battle_tag(&name);
        self.battle_tag_by_id(&id)
            .cloned()
            .ok_or_else(|| VaultError::not_found("battle tag", id))
    }

    /// Insert a fully built battle tag, replacing any with the same id.
    pub fn insert_battle_tag(&mut self, tag: BattleTag) {
        match self.battle_tags.iter_mut().find(|t| t.id == tag.id) {
            Some(existing) => *existing = tag,
            None => self.battle_tags.push(tag),
        }
    }

    pub fn rename_battle_tag(&mut self, id: &str, new_name: &str) -> Result<BattleTag> {
        let name = normalize_name("battle tag name", new_name)?;
        let taken = self
            .battle_tags
            .iter()
            .any(|t| t.id != id && same_name(&t.name, &name));
        if taken {
            return Err(VaultError::constraint(format!(
                "a battle tag named '{}' already exists",
                name
            )));
        }

        let tag = self
            .battle_tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| VaultError::not_found("battle tag", id))?;
        tag.name = name;
        tag.modified_at = now();
        Ok(tag.clone())
    }

    pub fn delete_battle_tag(&mut self, id: &str) -> Result<BattleTag> {
        let index = self
            .battle_tags
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| VaultError::not_found("battle tag", id))?;
        self.battle_combo_tag_links.retain(|l| l.battle_tag_id != id);
        Ok(self.battle_tags.remove(index))
    }

    /// Link a battle combo to a battle tag. Both must exist.
    pub fn link_battle(&mut self, combo_id: &str, tag_id: &str) -> Result<()> {
        if self.battle_combo_by_id(combo_id).is_none() {
            return Err(VaultError::constraint(format!(
                "cannot link: battle combo '{}' does not exist",
                combo_id
            )));
        }
        if self.battle_tag_by_id(tag_id).is_none() {
            return Err(VaultError::constraint(format!(
                "cannot link: battle tag '{}' does not exist",
                tag_id
            )));
        }
        self.push_battle_link(combo_id, tag_id);
        Ok(())
    }

    /// Id of the tag with this name, creating it if needed. `name` must be clean.
    fn ensure_battle_tag(&mut self, name: &str) -> String {
        if let Some(existing) = self.battle_tags.iter().find(|t| same_name(&t.name, name)) {
            return existing.id.clone();
        }
        let tag = BattleTag::new(name);
        let id = tag.id.clone();
        self.battle_tags.push(tag);
        id
    }

    fn push_battle_link(&mut self, combo_id: &str, tag_id: &str) {
        let link = BattleComboTagLink::new(combo_id, tag_id);
        if !self.battle_combo_tag_links.contains(&link) {
            self.battle_combo_tag_links.push(link);
        }
    }
}

fn clean_tag_names(names: &[String]) -> Result<Vec<String>> {
    names
        .iter()
        .map(|n| normalize_name("battle tag name", n))
        .collect()
}
