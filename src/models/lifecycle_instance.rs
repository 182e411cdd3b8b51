//! # Lifecycle Instance
//!
//! One farmer's tracked progression through a crop's stage catalog.
//!
//! The instance is the sole owner of its task collection. `current_stage_order`
//! only ever moves forward; day count, progress and stage statuses are derived
//! on read by the lifecycle engine and never stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::task::Task;
use crate::state_machine::states::EnrollmentState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleInstance {
    pub instance_id: i64,
    pub farmer_email: String,
    pub crop_type: String,
    /// Immutable once set
    pub sowing_date: NaiveDate,
    pub current_stage_id: String,
    pub current_stage_order: u32,
    pub state: EnrollmentState,
    /// Stage order, then template order within a stage
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Lifecycle instance before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLifecycleInstance {
    pub farmer_email: String,
    pub crop_type: String,
    pub sowing_date: NaiveDate,
    pub current_stage_id: String,
    pub current_stage_order: u32,
    pub tasks: Vec<Task>,
}

impl NewLifecycleInstance {
    pub fn into_instance(self, instance_id: i64, now: DateTime<Utc>) -> LifecycleInstance {
        LifecycleInstance {
            instance_id,
            farmer_email: self.farmer_email,
            crop_type: self.crop_type,
            sowing_date: self.sowing_date,
            current_stage_id: self.current_stage_id,
            current_stage_order: self.current_stage_order,
            state: EnrollmentState::Active,
            tasks: self.tasks,
            created_at: now,
            updated_at: now,
            archived_at: None,
        }
    }
}

impl LifecycleInstance {
    pub fn task(&self, task_id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn tasks_for_stage<'a>(&'a self, stage_id: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.stage_id == stage_id)
    }

    /// `(completed, total)` task counts for one stage
    pub fn stage_task_counts(&self, stage_id: &str) -> (usize, usize) {
        self.tasks_for_stage(stage_id)
            .fold((0, 0), |(done, total), task| {
                (done + usize::from(task.is_completed), total + 1)
            })
    }

    /// `(completed, total)` across the whole checklist
    pub fn overall_task_counts(&self) -> (usize, usize) {
        let done = self.tasks.iter().filter(|t| t.is_completed).count();
        (done, self.tasks.len())
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
