use crate::catalog::StageDefinition;
use crate::models::LifecycleInstance;

use super::errors::{LifecycleError, LifecycleResult};

/// Precondition checked before a stage advance is applied
pub trait AdvanceGuard: Send + Sync {
    fn check(&self, instance: &LifecycleInstance, current: &StageDefinition) -> LifecycleResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Default guard: advancing never depends on task completion
pub struct PermissiveAdvanceGuard;

impl AdvanceGuard for PermissiveAdvanceGuard {
    fn check(&self, _instance: &LifecycleInstance, _current: &StageDefinition) -> LifecycleResult<()> {
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Stage may advance regardless of task completion"
    }
}

/// Opt-in guard requiring every task of the current stage to be checked
pub struct StageTasksCompleteGuard;

impl AdvanceGuard for StageTasksCompleteGuard {
    fn check(&self, instance: &LifecycleInstance, current: &StageDefinition) -> LifecycleResult<()> {
        let (done, total) = instance.stage_task_counts(&current.id);
        if done < total {
            return Err(LifecycleError::StageTasksIncomplete {
                stage_id: current.id.clone(),
                remaining: total - done,
            });
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "All tasks of the current stage must be complete"
    }
}

/// Guard selected by configuration
pub fn advance_guard(require_stage_tasks: bool) -> Box<dyn AdvanceGuard> {
    if require_stage_tasks {
        Box::new(StageTasksCompleteGuard)
    } else {
        Box::new(PermissiveAdvanceGuard)
    }
}
