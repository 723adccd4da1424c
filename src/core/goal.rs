//! Practice goals and their progress stages.
//!
//! A goal ("Land a clean airflare") is broken into stages, each with a
//! target count in some unit ("50 reps", "10 sessions"). Progress is tracked
//! per stage and always stays within `0..=target_count`.

use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now};

/// Longest allowed goal title.
pub const GOAL_TITLE_MAX_CHARS: usize = 100;

/// Longest allowed stage name.
pub const STAGE_NAME_MAX_CHARS: usize = 30;

/// Longest allowed stage unit.
pub const STAGE_UNIT_MAX_CHARS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub created_at: DateTime<Utc>,
    /// Bumped on edits, archiving and any stage progress.
    #[serde(with = "ts_milliseconds", default = "now")]
    pub last_updated: DateTime<Utc>,
}

impl Goal {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: new_id(),
            title: title.into(),
            description: description.into(),
            is_archived: false,
            created_at: ts,
            last_updated: ts,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn touch(&mut self) {
        self.last_updated = now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoalStage {
    pub id: String,
    pub goal_id: String,
    pub name: String,
    #[serde(default)]
    pub current_count: u32,
    pub target_count: u32,
    pub unit: String,
    #[serde(with = "ts_milliseconds", default = "now")]
    pub created_at: DateTime<Utc>,
}

impl GoalStage {
    pub fn new(
        goal_id: impl Into<String>,
        name: impl Into<String>,
        target_count: u32,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            goal_id: goal_id.into(),
            name: name.into(),
            current_count: 0,
            target_count,
            unit: unit.into(),
            created_at: now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Add `amount` (possibly negative) to the count, clamped to `0..=target_count`.
    pub fn apply_progress(&mut self, amount: i64) {
        let next = i64::from(self.current_count).saturating_add(amount);
        self.current_count = next.clamp(0, i64::from(self.target_count)) as u32;
    }

    /// Fraction complete in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.target_count == 0 {
            return 0.0;
        }
        f64::from(self.current_count.min(self.target_count)) / f64::from(self.target_count)
    }

    pub fn is_complete(&self) -> bool {
        self.target_count > 0 && self.current_count >= self.target_count
    }
}

/// A goal with its stages in creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalWithStages {
    pub goal: Goal,
    pub stages: Vec<GoalStage>,
}

impl GoalWithStages {
    /// Mean stage progress; 0.0 when the goal has no stages.
    pub fn progress(&self) -> f64 {
        if self.stages.is_empty() {
            return 0.0;
        }
        self.stages.iter().map(GoalStage::progress).sum::<f64>() / self.stages.len() as f64
    }

    pub fn completed_stages(&self) -> usize {
        self.stages.iter().filter(|s| s.is_complete()).count()
    }
}
