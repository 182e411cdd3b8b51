//! # Task Checklist Model
//!
//! Per-stage task lists with completion flags. Tasks for every stage are
//! created up front, including stages not reached yet, and are never deleted.
//! There is no dependency graph between tasks: any task may be toggled at any
//! time regardless of its siblings.

use crate::catalog::StageDefinition;
use crate::models::{LifecycleInstance, Task};

use super::errors::{LifecycleError, LifecycleResult};

/// Create the checklist for a new lifecycle.
///
/// One task per template entry in every stage, all open, ids assigned
/// sequentially from 1 in stage order then template order.
pub fn instantiate_tasks(stages: &[StageDefinition]) -> Vec<Task> {
    stages
        .iter()
        .flat_map(|stage| {
            stage
                .task_templates
                .iter()
                .map(move |name| (stage.id.as_str(), name.as_str()))
        })
        .enumerate()
        .map(|(index, (stage_id, name))| Task::new(index as i64 + 1, stage_id, name))
        .collect()
}

/// Flip one task's completion flag in place and return its new state.
///
/// Two calls in a row restore the original value. An unknown id leaves the
/// instance untouched.
pub fn toggle(instance: &mut LifecycleInstance, task_id: i64) -> LifecycleResult<Task> {
    let task = instance
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or(LifecycleError::TaskNotFound { task_id })?;

    task.is_completed = !task.is_completed;
    Ok(task.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StageCatalog;
    use crate::models::NewLifecycleInstance;
    use chrono::{NaiveDate, Utc};

    fn wheat_instance() -> LifecycleInstance {
        let catalog = StageCatalog::bundled().unwrap();
        let stages = catalog.stages_for("wheat").unwrap();
        NewLifecycleInstance {
            farmer_email: "farmer@example.in".to_string(),
            crop_type: "wheat".to_string(),
            sowing_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            current_stage_id: stages[0].id.clone(),
            current_stage_order: 0,
            tasks: instantiate_tasks(stages),
        }
        .into_instance(1, Utc::now())
    }

    #[test]
    fn test_instantiate_covers_every_stage() {
        let instance = wheat_instance();
        assert_eq!(instance.tasks.len(), 17);
        assert!(instance.tasks.iter().all(|t| !t.is_completed));
        assert_eq!(instance.tasks[0].id, 1);
        assert_eq!(instance.tasks[0].stage_id, "planning");
        assert_eq!(instance.tasks.last().unwrap().stage_id, "harvest");
        assert_eq!(instance.stage_task_counts("growth"), (0, 4));
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let mut instance = wheat_instance();
        let first = toggle(&mut instance, 5).unwrap();
        assert!(first.is_completed);
        let second = toggle(&mut instance, 5).unwrap();
        assert!(!second.is_completed);
        assert_eq!(instance.task(5).unwrap().is_completed, false);
    }

    #[test]
    fn test_toggle_ignores_sibling_state() {
        let mut instance = wheat_instance();
        // Last task of a later stage can be checked before anything else
        let last_id = instance.tasks.last().unwrap().id;
        assert!(toggle(&mut instance, last_id).unwrap().is_completed);
    }

    #[test]
    fn test_toggle_unknown_task_mutates_nothing() {
        let mut instance = wheat_instance();
        let before = instance.clone();
        assert_eq!(
            toggle(&mut instance, 999).unwrap_err(),
            LifecycleError::TaskNotFound { task_id: 999 }
        );
        assert_eq!(instance, before);
    }
}
