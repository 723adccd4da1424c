//! Moves, move tags and the cross-reference between them.

use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now};

/// A single move in the catalogue (e.g. "Windmill").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    /// Unique identifier (UUID unless imported).
    pub id: String,
    /// Display name.
    pub name: String,
    /// When the move was created.
    #[serde(with = "ts_milliseconds", default = "now")]
    pub created_at: DateTime<Utc>,
    /// When the name was last changed.
    #[serde(with = "ts_milliseconds", default = "now")]
    pub modified_at: DateTime<Utc>,
}

impl Move {
    /// Create a move with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: new_id(),
            name: name.into(),
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

/// A label grouping moves (e.g. "Power", "Footwork").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveTag {
    /// Unique identifier.
    pub id: String,
    /// Display name, unique ignoring case.
    pub name: String,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub modified_at: DateTime<Utc>,
}

impl MoveTag {
    /// Create a tag with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: new_id(),
            name: name.into(),
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

/// Cross-reference row linking a move to a tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct MoveTagLink {
    pub move_id: String,
    pub tag_id: String,
}

impl MoveTagLink {
    pub fn new(move_id: impl Into<String>, tag_id: impl Into<String>) -> Self {
        Self {
            move_id: move_id.into(),
            tag_id: tag_id.into(),
        }
    }
}

/// A move together with all of its tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveWithTags {
    #[serde(rename = "move")]
    pub mv: Move,
    pub tags: Vec<MoveTag>,
}

impl MoveWithTags {
    /// Whether the move carries the tag with the given id.
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    /// Tag names joined for display.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }
}

/// A tag together with all moves carrying it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagWithMoves {
    pub tag: MoveTag,
    pub moves: Vec<Move>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_json_uses_camel_case_and_millis() {
        let mv = Move::new("Windmill").with_id("m1");
        let json = serde_json::to_value(&mv).unwrap();

        assert_eq!(json["id"], "m1");
        assert_eq!(json["name"], "Windmill");
        assert_eq!(json["createdAt"], mv.created_at.timestamp_millis());
        assert!(json.get("modifiedAt").is_some());
    }

    #[test]
    fn test_move_without_timestamps_deserializes() {
        let mv: Move = serde_json::from_str(r#"{"id":"m1","name":"CC"}"#).unwrap();
        assert_eq!(mv.id, "m1");
        assert_eq!(mv.name, "CC");
    }

    #[test]
    fn test_link_json_field_names() {
        let link = MoveTagLink::new("m1", "t1");
        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(json, r#"{"moveId":"m1","tagId":"t1"}"#);
    }

    #[test]
    fn test_move_with_tags_helpers() {
        let power = MoveTag::new("Power").with_id("t1");
        let style = MoveTag::new("Style").with_id("t2");
        let mwt = MoveWithTags {
            mv: Move::new("Halo"),
            tags: vec![power, style],
        };

        assert!(mwt.has_tag("t1"));
        assert!(!mwt.has_tag("t3"));
        assert_eq!(mwt.tag_names(), vec!["Power", "Style"]);
    }
}
