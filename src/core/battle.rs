//! Battle combos: freeform rounds prepared for competition.
//!
//! Battle combos are tracked separately from generated combos. Each one has
//! an energy level, a training status, a "used" flag that is flipped during
//! a battle, and any number of battle tags.

use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{new_id, now};
use crate::error::VaultError;

/// How much energy a round takes. Ordered low to high, `None` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
    #[default]
    None,
}

impl EnergyLevel {
    pub fn all() -> &'static [EnergyLevel] {
        &[
            EnergyLevel::Low,
            EnergyLevel::Medium,
            EnergyLevel::High,
            EnergyLevel::None,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
            EnergyLevel::None => "none",
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnergyLevel {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(EnergyLevel::Low),
            "medium" => Ok(EnergyLevel::Medium),
            "high" => Ok(EnergyLevel::High),
            "none" => Ok(EnergyLevel::None),
            other => Err(VaultError::validation(format!(
                "unknown energy level '{}' (expected low, medium, high or none)",
                other
            ))),
        }
    }
}

/// Whether a round is battle-ready or still being drilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingStatus {
    Ready,
    #[default]
    Training,
}

impl TrainingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::Ready => "ready",
            TrainingStatus::Training => "training",
        }
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingStatus {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ready" => Ok(TrainingStatus::Ready),
            "training" => Ok(TrainingStatus::Training),
            other => Err(VaultError::validation(format!(
                "unknown training status '{}' (expected ready or training)",
                other
            ))),
        }
    }
}

/// A prepared battle round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BattleCombo {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub energy: EnergyLevel,
    #[serde(default)]
    pub status: TrainingStatus,
    /// Set while the round has been thrown in the current battle.
    #[serde(default)]
    pub is_used: bool,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub created_at: DateTime<Utc>,
    /// Content changes only; toggling `is_used` leaves this alone.
    #[serde(with = "ts_milliseconds", default = "now")]
    pub modified_at: DateTime<Utc>,
}

impl BattleCombo {
    pub fn new(description: impl Into<String>, energy: EnergyLevel, status: TrainingStatus) -> Self {
        let ts = now();
        Self {
            id: new_id(),
            description: description.into(),
            energy,
            status,
            is_used: false,
            created_at: ts,
            modified_at: ts,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Label for battle combos (e.g. "Aggressive").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BattleTag {
    pub id: String,
    pub name: String,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub modified_at: DateTime<Utc>,
}

impl BattleTag {
    pub fn new(name: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: new_id(),
            name: name.into(),
            created_at: ts,
            modified_at: ts,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Cross-reference row linking a battle combo to a battle tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct BattleComboTagLink {
    pub battle_combo_id: String,
    pub battle_tag_id: String,
}

impl BattleComboTagLink {
    pub fn new(battle_combo_id: impl Into<String>, battle_tag_id: impl Into<String>) -> Self {
        Self {
            battle_combo_id: battle_combo_id.into(),
            battle_tag_id: battle_tag_id.into(),
        }
    }
}

/// A battle combo together with its tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BattleComboWithTags {
    pub combo: BattleCombo,
    pub tags: Vec<BattleTag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_level_json_is_uppercase() {
        assert_eq!(serde_json::to_string(&EnergyLevel::High).unwrap(), "\"HIGH\"");
        let parsed: EnergyLevel = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(parsed, EnergyLevel::Medium);
    }

    #[test]
    fn test_energy_level_ordering() {
        let mut levels = vec![
            EnergyLevel::None,
            EnergyLevel::High,
            EnergyLevel::Low,
            EnergyLevel::Medium,
        ];
        levels.sort();
        assert_eq!(levels, EnergyLevel::all());
    }

    #[test]
    fn test_energy_level_from_str() {
        assert_eq!("High".parse::<EnergyLevel>().unwrap(), EnergyLevel::High);
        assert!("extreme".parse::<EnergyLevel>().is_err());
    }

    #[test]
    fn test_training_status_from_str() {
        assert_eq!(
            " READY ".parse::<TrainingStatus>().unwrap(),
            TrainingStatus::Ready
        );
        assert!("done".parse::<TrainingStatus>().is_err());
    }

    #[test]
    fn test_battle_combo_defaults() {
        let combo: BattleCombo =
            serde_json::from_str(r#"{"id":"b1","description":"Burn round"}"#).unwrap();

        assert_eq!(combo.energy, EnergyLevel::None);
        assert_eq!(combo.status, TrainingStatus::Training);
        assert!(!combo.is_used);
    }

    #[test]
    fn test_battle_combo_json_roundtrip() {
        let mut combo = BattleCombo::new(
            "Test Combo with Power",
            EnergyLevel::High,
            TrainingStatus::Ready,
        );
        combo.is_used = true;

        let json = serde_json::to_string(&combo).unwrap();
        let parsed: BattleCombo = serde_json::from_str(&json).unwrap();

        assert_eq!(combo, parsed);
        assert!(json.contains("\"isUsed\":true"));
    }

    #[test]
    fn test_link_json_field_names() {
        let link = BattleComboTagLink::new("combo-1", "tag-1");
        assert_eq!(
            serde_json::to_string(&link).unwrap(),
            r#"{"battleComboId":"combo-1","battleTagId":"tag-1"}"#
        );
    }
}
