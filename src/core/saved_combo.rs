//! Saved combos.
//!
//! A saved combo stores move *names*, not move ids. Deleting or renaming a
//! move never touches combos that already mention it.

use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now};

/// A named, ordered list of move names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedCombo {
    pub id: String,
    pub name: String,
    /// Move names in performance order. Repeats are allowed.
    #[serde(default)]
    pub moves: Vec<String>,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub modified_at: DateTime<Utc>,
}

impl SavedCombo {
    /// Create a combo with a fresh id.
    pub fn new(name: impl Into<String>, moves: Vec<String>) -> Self {
        let ts = now();
        Self {
            id: new_id(),
            name: name.into(),
            moves,
            created_at: ts,
            modified_at: ts,
        }
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Name given to a combo saved without one: `Combo yyyyMMdd_HHmmss`.
pub fn default_combo_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Combo {}", at.format("%Y%m%d_%H%M%S"))
}

/// Default combo name for the current local time.
pub fn default_combo_name_now() -> String {
    default_combo_name(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_combo_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(default_combo_name(&at), "Combo 20240309_070501");
    }

    #[test]
    fn test_default_combo_name_now_has_prefix() {
        let name = default_combo_name_now();
        assert!(name.starts_with("Combo "));
        assert_eq!(name.len(), "Combo yyyyMMdd_HHmmss".len());
    }

    #[test]
    fn test_saved_combo_moves_default_to_empty() {
        let combo: SavedCombo = serde_json::from_str(r#"{"id":"c1","name":"Empty"}"#).unwrap();
        assert!(combo.moves.is_empty());
    }

    #[test]
    fn test_saved_combo_json_moves_is_string_list() {
        let combo = SavedCombo::new("Power Set", vec!["Windmill".into(), "Windmill".into()]);
        let json = serde_json::to_value(&combo).unwrap();
        assert_eq!(json["moves"], serde_json::json!(["Windmill", "Windmill"]));
    }
}
