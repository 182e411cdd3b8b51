//! # Optimistic Toggle
//!
//! Two-phase task toggle for clients that render before the server answers:
//! `apply` flips the task in a local [`LifecycleStatusView`] immediately, then
//! either `reconcile` adopts the server's confirmed task or `rollback` restores
//! the value seen before `apply`.
//!
//! Only `is_completed` is touched. Derived fields such as
//! `progress_percentage` and `is_complete` stay as last served until the next
//! status read.

use crate::models::{LifecycleStatusView, Task};

use super::errors::{LifecycleError, LifecycleResult};

/// A pending local toggle awaiting server confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticToggle {
    task_id: i64,
    previous: bool,
}

impl OptimisticToggle {
    /// Flip the task locally and remember its prior state
    pub fn apply(view: &mut LifecycleStatusView, task_id: i64) -> LifecycleResult<Self> {
        let task = view
            .task_mut(task_id)
            .ok_or(LifecycleError::TaskNotFound { task_id })?;
        let previous = task.is_completed;
        task.is_completed = !previous;
        Ok(Self { task_id, previous })
    }

    /// Adopt the server's answer, whatever the local guess was.
    ///
    /// A confirmation for some other task is not an answer to this toggle: the
    /// local flip is rolled back and `false` is returned.
    pub fn reconcile(self, view: &mut LifecycleStatusView, confirmed: &Task) -> bool {
        if confirmed.id != self.task_id {
            self.rollback(view);
            return false;
        }
        if let Some(task) = view.task_mut(self.task_id) {
            task.is_completed = confirmed.is_completed;
        }
        true
    }

    /// Undo the local flip after the server call failed
    pub fn rollback(self, view: &mut LifecycleStatusView) {
        if let Some(task) = view.task_mut(self.task_id) {
            task.is_completed = self.previous;
        }
    }

    pub fn task_id(&self) -> i64 {
        self.task_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimelineEntry;
    use crate::state_machine::states::StageStatus;
    use chrono::NaiveDate;

    fn view() -> LifecycleStatusView {
        LifecycleStatusView {
            crop: "Rice".to_string(),
            sowing_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            day_count: 3,
            current_stage: "Nursery".to_string(),
            current_stage_id: "nursery".to_string(),
            nominal_stage: Some("Nursery".to_string()),
            total_days: 140,
            progress_percentage: 0.0,
            is_complete: false,
            timeline: vec![TimelineEntry {
                id: "nursery".to_string(),
                label: "Nursery".to_string(),
                status: StageStatus::Current,
                description: None,
                date: "In Progress".to_string(),
                tasks: vec![Task::new(1, "nursery", "Prepare nursery bed")],
                ai_summary: None,
            }],
            ai_summary: None,
            history: vec![],
        }
    }

    #[test]
    fn test_apply_then_rollback_restores() {
        let mut view = view();
        let pending = OptimisticToggle::apply(&mut view, 1).unwrap();
        assert!(view.task(1).unwrap().is_completed);
        pending.rollback(&mut view);
        assert!(!view.task(1).unwrap().is_completed);
    }

    #[test]
    fn test_reconcile_prefers_server_state() {
        let mut view = view();
        let pending = OptimisticToggle::apply(&mut view, 1).unwrap();
        // A concurrent toggle elsewhere means the server still reports open
        let confirmed = Task::new(1, "nursery", "Prepare nursery bed");
        assert!(pending.reconcile(&mut view, &confirmed));
        assert!(!view.task(1).unwrap().is_completed);
    }

    #[test]
    fn test_reconcile_with_another_task_rolls_back() {
        let mut view = view();
        view.timeline[0]
            .tasks
            .push(Task::new(2, "nursery", "Treat seeds"));
        let pending = OptimisticToggle::apply(&mut view, 1).unwrap();

        let mut other = Task::new(2, "nursery", "Treat seeds");
        other.is_completed = true;
        assert!(!pending.reconcile(&mut view, &other));

        assert!(!view.task(1).unwrap().is_completed);
        assert!(!view.task(2).unwrap().is_completed);
        assert_eq!(view.progress_percentage, 0.0);
    }

    #[test]
    fn test_apply_unknown_task() {
        let mut view = view();
        let before = view.clone();
        assert_eq!(
            OptimisticToggle::apply(&mut view, 9).unwrap_err(),
            LifecycleError::TaskNotFound { task_id: 9 }
        );
        assert_eq!(view, before);
    }
}
