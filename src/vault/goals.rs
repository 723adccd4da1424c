//! Goal and goal stage operations.

use super::{resolve, Vault};
use crate::core::{
    check_max_chars, normalize_name, Goal, GoalStage, GoalWithStages, GOAL_TITLE_MAX_CHARS,
    STAGE_NAME_MAX_CHARS, STAGE_UNIT_MAX_CHARS,
};
use crate::error::{Result, VaultError};

/// Partial update for a goal stage. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalStageUpdate {
    pub name: Option<String>,
    pub target_count: Option<u32>,
    pub unit: Option<String>,
}

impl Vault {
    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn goal_by_id(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn goal_stage_by_id(&self, id: &str) -> Option<&GoalStage> {
        self.goal_stages.iter().find(|s| s.id == id)
    }

    /// Look a goal up by id or title.
    pub fn resolve_goal(&self, key: &str) -> Result<&Goal> {
        resolve(&self.goals, "goal", key, |g| &g.id, |g| &g.title)
    }

    /// Look a stage up by id or name.
    pub fn resolve_goal_stage(&self, key: &str) -> Result<&GoalStage> {
        resolve(&self.goal_stages, "stage", key, |s| &s.id, |s| &s.name)
    }

    /// Stages of a goal in creation order.
    pub fn stages_for_goal(&self, goal_id: &str) -> Vec<GoalStage> {
        let mut stages: Vec<GoalStage> = self
            .goal_stages
            .iter()
            .filter(|s| s.goal_id == goal_id)
            .cloned()
            .collect();
        stages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        stages
    }

    pub fn goal_with_stages(&self, id: &str) -> Option<GoalWithStages> {
        self.goal_by_id(id).map(|goal| GoalWithStages {
            goal: goal.clone(),
            stages: self.stages_for_goal(&goal.id),
        })
    }

    /// Goals not archived, most recently updated first.
    pub fn active_goals(&self) -> Vec<GoalWithStages> {
        self.goals_where(false)
    }

    /// Archived goals, most recently updated first.
    pub fn archived_goals(&self) -> Vec<GoalWithStages> {
        self.goals_where(true)
    }

    fn goals_where(&self, archived: bool) -> Vec<GoalWithStages> {
        let mut goals: Vec<GoalWithStages> = self
            .goals
            .iter()
            .filter(|g| g.is_archived == archived)
            .map(|goal| GoalWithStages {
                goal: goal.clone(),
                stages: self.stages_for_goal(&goal.id),
            })
            .collect();
        goals.sort_by(|a, b| b.goal.last_updated.cmp(&a.goal.last_updated));
        goals
    }

    // -------------------------------------------------------------------------
    // Goals
    // -------------------------------------------------------------------------

    pub fn create_goal(&mut self, title: &str, description: &str) -> Result<Goal> {
        let title = clean_title(title)?;
        let goal = Goal::new(title, description.trim());
        self.goals.push(goal.clone());

        tracing::debug!(goal_id = %goal.id, title = %goal.title, "created goal");
        Ok(goal)
    }

    /// Insert a fully built goal, replacing any with the same id.
    pub fn insert_goal(&mut self, goal: Goal) {
        match self.goals.iter_mut().find(|g| g.id == goal.id) {
            Some(existing) => *existing = goal,
            None => self.goals.push(goal),
        }
    }

    pub fn update_goal(
        &mut self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Goal> {
        let title = title.map(clean_title).transpose()?;
        let goal = self.goal_mut(id)?;
        if let Some(title) = title {
            goal.title = title;
        }
        if let Some(description) = description {
            goal.description = description.trim().to_string();
        }
        goal.touch();
        Ok(goal.clone())
    }

    pub fn archive_goal(&mut self, id: &str) -> Result<Goal> {
        self.set_archived(id, true)
    }

    pub fn unarchive_goal(&mut self, id: &str) -> Result<Goal> {
        self.set_archived(id, false)
    }

    fn set_archived(&mut self, id: &str, archived: bool) -> Result<Goal> {
        let goal = self.goal_mut(id)?;
        goal.is_archived = archived;
        goal.touch();
        Ok(goal.clone())
    }

    /// Delete a goal and all of its stages. Returns the goal and the stage count.
    pub fn delete_goal(&mut self, id: &str) -> Result<(Goal, usize)> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| VaultError::not_found("goal", id))?;

        let before = self.goal_stages.len();
        self.goal_stages.retain(|s| s.goal_id != id);
        let removed_stages = before - self.goal_stages.len();
        let goal = self.goals.remove(index);

        tracing::debug!(goal_id = %id, removed_stages, "deleted goal");
        Ok((goal, removed_stages))
    }

    fn goal_mut(&mut self, id: &str) -> Result<&mut Goal> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| VaultError::not_found("goal", id))
    }

    fn touch_goal(&mut self, id: &str) {
        if let Some(goal) = self.goals.iter_mut().find(|g| g.id == id) {
            goal.touch();
        }
    }

    // -------------------------------------------------------------------------
    // Stages
    // -------------------------------------------------------------------------

    pub fn add_goal_stage(
        &mut self,
        goal_id: &str,
        name: &str,
        target_count: u32,
        unit: &str,
    ) -> Result<GoalStage> {
        let name = clean_stage_name(name)?;
        let unit = clean_unit(unit)?;
        check_target(target_count)?;
        if self.goal_by_id(goal_id).is_none() {
            return Err(VaultError::constraint(format!(
                "goal '{}' does not exist",
                goal_id
            )));
        }

        let stage = GoalStage::new(goal_id, name, target_count, unit);
        self.goal_stages.push(stage.clone());
        self.touch_goal(goal_id);

        tracing::debug!(stage_id = %stage.id, goal_id = %goal_id, target_count, "added goal stage");
        Ok(stage)
    }

    /// Insert a fully built stage. Its goal must exist.
    pub fn insert_goal_stage(&mut self, stage: GoalStage) -> Result<()> {
        if self.goal_by_id(&stage.goal_id).is_none() {
            return Err(VaultError::constraint(format!(
                "goal '{}' does not exist",
                stage.goal_id
            )));
        }
        match self.goal_stages.iter_mut().find(|s| s.id == stage.id) {
            Some(existing) => *existing = stage,
            None => self.goal_stages.push(stage),
        }
        Ok(())
    }

    /// Edit a stage. A lower target clamps the current count.
    pub fn update_goal_stage(&mut self, id: &str, update: GoalStageUpdate) -> Result<GoalStage> {
        let name = update.name.as_deref().map(clean_stage_name).transpose()?;
        let unit = update.unit.as_deref().map(clean_unit).transpose()?;
        if let Some(target) = update.target_count {
            check_target(target)?;
        }

        let stage = self.stage_mut(id)?;
        if let Some(name) = name {
            stage.name = name;
        }
        if let Some(unit) = unit {
            stage.unit = unit;
        }
        if let Some(target) = update.target_count {
            stage.target_count = target;
            stage.apply_progress(0);
        }
        let updated = stage.clone();

        self.touch_goal(&updated.goal_id);
        Ok(updated)
    }

    /// Add (or with a negative amount, remove) progress on a stage.
    pub fn increment_stage_progress(&mut self, id: &str, amount: i64) -> Result<GoalStage> {
        let stage = self.stage_mut(id)?;
        stage.apply_progress(amount);
        let updated = stage.clone();

        self.touch_goal(&updated.goal_id);
        tracing::debug!(stage_id = %id, amount, current = updated.current_count, "stage progress");
        Ok(updated)
    }

    pub fn delete_goal_stage(&mut self, id: &str) -> Result<GoalStage> {
        let index = self
            .goal_stages
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| VaultError::not_found("stage", id))?;
        let stage = self.goal_stages.remove(index);
        self.touch_goal(&stage.goal_id);
        Ok(stage)
    }

    fn stage_mut(&mut self, id: &str) -> Result<&mut GoalStage> {
        self.goal_stages
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| VaultError::not_found("stage", id))
    }
}

fn clean_title(title: &str) -> Result<String> {
    let title = normalize_name("goal title", title)?;
    check_max_chars("goal title", &title, GOAL_TITLE_MAX_CHARS)?;
    Ok(title)
}

fn clean_stage_name(name: &str) -> Result<String> {
    let name = normalize_name("stage name", name)?;
    check_max_chars("stage name", &name, STAGE_NAME_MAX_CHARS)?;
    Ok(name)
}

fn clean_unit(unit: &str) -> Result<String> {
    let unit = normalize_name("unit", unit)?;
    check_max_chars("unit", &unit, STAGE_UNIT_MAX_CHARS)?;
    Ok(unit)
}

fn check_target(target: u32) -> Result<()> {
    if target == 0 {
        return Err(VaultError::validation("target must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn vault_with_goal() -> (Vault, Goal) {
        let mut vault = Vault::new();
        let goal = vault.create_goal("Airflare", "Clean airflares").unwrap();
        (vault, goal)
    }

    #[test]
    fn test_create_goal_validation() {
        let mut vault = Vault::new();
        assert!(vault.create_goal("  ", "").is_err());
        assert!(vault.create_goal(&"x".repeat(101), "").is_err());
        assert!(vault.create_goal(&"x".repeat(100), "").is_ok());
    }

    #[test]
    fn test_add_stage_validation() {
        let (mut vault, goal) = vault_with_goal();

        assert!(vault.add_goal_stage(&goal.id, "", 10, "reps").is_err());
        assert!(vault.add_goal_stage(&goal.id, "Drill", 0, "reps").is_err());
        assert!(vault
            .add_goal_stage(&goal.id, &"s".repeat(31), 10, "reps")
            .is_err());
        assert!(vault
            .add_goal_stage(&goal.id, "Drill", 10, "repetitions")
            .is_err());
        assert!(matches!(
            vault.add_goal_stage("missing", "Drill", 10, "reps"),
            Err(VaultError::Constraint { .. })
        ));
        assert!(vault.stages_for_goal(&goal.id).is_empty());
    }

    #[test]
    fn test_add_stage_bumps_goal() {
        let (mut vault, goal) = vault_with_goal();
        vault.goals[0].last_updated = goal.last_updated - Duration::minutes(1);

        vault.add_goal_stage(&goal.id, "Drill", 10, "reps").unwrap();

        assert!(vault.goal_by_id(&goal.id).unwrap().last_updated > goal.last_updated - Duration::minutes(1));
    }

    #[test]
    fn test_increment_progress_clamps() {
        let (mut vault, goal) = vault_with_goal();
        let stage = vault.add_goal_stage(&goal.id, "Drill", 10, "reps").unwrap();

        assert_eq!(vault.increment_stage_progress(&stage.id, 7).unwrap().current_count, 7);
        assert_eq!(vault.increment_stage_progress(&stage.id, 7).unwrap().current_count, 10);
        assert_eq!(vault.increment_stage_progress(&stage.id, -20).unwrap().current_count, 0);
    }

    #[test]
    fn test_update_stage_clamps_current_to_new_target() {
        let (mut vault, goal) = vault_with_goal();
        let stage = vault.add_goal_stage(&goal.id, "Drill", 10, "reps").unwrap();
        vault.increment_stage_progress(&stage.id, 8).unwrap();

        let updated = vault
            .update_goal_stage(
                &stage.id,
                GoalStageUpdate {
                    target_count: Some(5),
                    unit: Some("sets".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.target_count, 5);
        assert_eq!(updated.current_count, 5);
        assert_eq!(updated.unit, "sets");
        assert_eq!(updated.name, "Drill");
    }

    #[test]
    fn test_delete_goal_removes_stages() {
        let (mut vault, goal) = vault_with_goal();
        vault.add_goal_stage(&goal.id, "One", 5, "reps").unwrap();
        vault.add_goal_stage(&goal.id, "Two", 5, "reps").unwrap();

        let (_, removed) = vault.delete_goal(&goal.id).unwrap();

        assert_eq!(removed, 2);
        assert!(vault.goal_stages.is_empty());
        assert!(vault.goal_by_id(&goal.id).is_none());
    }

    #[test]
    fn test_archive_and_unarchive() {
        let (mut vault, goal) = vault_with_goal();

        vault.archive_goal(&goal.id).unwrap();
        assert!(vault.active_goals().is_empty());
        assert_eq!(vault.archived_goals().len(), 1);

        vault.unarchive_goal(&goal.id).unwrap();
        assert_eq!(vault.active_goals().len(), 1);
    }

    #[test]
    fn test_active_goals_most_recent_first() {
        let mut vault = Vault::new();
        let old = vault.create_goal("Old", "").unwrap();
        vault.create_goal("New", "").unwrap();
        vault.goals[0].last_updated = old.last_updated - Duration::hours(1);

        let titles: Vec<String> = vault
            .active_goals()
            .into_iter()
            .map(|g| g.goal.title)
            .collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[test]
    fn test_update_goal() {
        let (mut vault, goal) = vault_with_goal();

        let updated = vault
            .update_goal(&goal.id, Some("Airflares"), None)
            .unwrap();

        assert_eq!(updated.title, "Airflares");
        assert_eq!(updated.description, "Clean airflares");
        assert!(vault.update_goal(&goal.id, Some(""), None).is_err());
    }

    #[test]
    fn test_delete_stage() {
        let (mut vault, goal) = vault_with_goal();
        let stage = vault.add_goal_stage(&goal.id, "Drill", 10, "reps").unwrap();

        vault.delete_goal_stage(&stage.id).unwrap();

        assert!(vault.goal_with_stages(&goal.id).unwrap().stages.is_empty());
        assert!(vault.delete_goal_stage(&stage.id).is_err());
    }
}
