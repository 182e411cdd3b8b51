use chrono::{DateTime, Utc};
use tracing::debug;

use super::{
    checklist,
    errors::{instance_not_found, LifecycleError, LifecycleResult},
    events::LifecycleEvent,
    guards::{AdvanceGuard, PermissiveAdvanceGuard},
    states::EnrollmentState,
};
use crate::catalog::{CropCatalogEntry, StageDefinition};
use crate::models::{LifecycleInstance, Task};

/// Result of a successful transition
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    TaskToggled(Task),
    StageAdvanced {
        from_stage_id: String,
        to_stage: StageDefinition,
    },
    Archived,
}

/// State machine over the stage order of one lifecycle instance.
///
/// States are the catalog orders `0..N-1`. The machine borrows the instance
/// mutably for the duration of one mutation; callers are responsible for
/// serializing access per instance and persisting the result.
pub struct LifecycleStateMachine<'a> {
    instance: &'a mut LifecycleInstance,
    entry: &'a CropCatalogEntry,
    guard: &'a dyn AdvanceGuard,
}

impl<'a> LifecycleStateMachine<'a> {
    pub fn new(instance: &'a mut LifecycleInstance, entry: &'a CropCatalogEntry) -> Self {
        Self::with_guard(instance, entry, &PermissiveAdvanceGuard)
    }

    pub fn with_guard(
        instance: &'a mut LifecycleInstance,
        entry: &'a CropCatalogEntry,
        guard: &'a dyn AdvanceGuard,
    ) -> Self {
        Self {
            instance,
            entry,
            guard,
        }
    }

    /// Apply an event. On error the instance is left exactly as it was.
    pub fn transition(
        &mut self,
        event: LifecycleEvent,
        now: DateTime<Utc>,
    ) -> LifecycleResult<TransitionOutcome> {
        if !self.instance.is_active() {
            return Err(instance_not_found(&self.instance.farmer_email));
        }

        let outcome = match event {
            LifecycleEvent::ToggleTask(task_id) => {
                TransitionOutcome::TaskToggled(checklist::toggle(self.instance, task_id)?)
            }
            LifecycleEvent::AdvanceStage => self.advance_stage()?,
            LifecycleEvent::Complete => {
                if !self.entry.is_final(self.instance.current_stage_order) {
                    return Err(LifecycleError::NotAtFinalStage {
                        stage_id: self.instance.current_stage_id.clone(),
                    });
                }
                self.archive(now);
                TransitionOutcome::Archived
            }
            LifecycleEvent::Disenroll => {
                self.archive(now);
                TransitionOutcome::Archived
            }
        };

        self.instance.updated_at = now;
        debug!(
            instance_id = self.instance.instance_id,
            event = event.event_type(),
            stage = %self.instance.current_stage_id,
            "Lifecycle transition applied"
        );
        Ok(outcome)
    }

    fn advance_stage(&mut self) -> LifecycleResult<TransitionOutcome> {
        let target_order = self.determine_target_order()?;
        let target = self
            .entry
            .stage_at(target_order)
            .cloned()
            .ok_or_else(|| LifecycleError::AlreadyAtFinalStage {
                stage_id: self.instance.current_stage_id.clone(),
            })?;

        if let Some(current) = self.entry.stage_at(self.instance.current_stage_order) {
            self.guard.check(self.instance, current)?;
        }

        let from_stage_id = std::mem::replace(&mut self.instance.current_stage_id, target.id.clone());
        self.instance.current_stage_order = target.order;

        Ok(TransitionOutcome::StageAdvanced {
            from_stage_id,
            to_stage: target,
        })
    }

    /// Next stage order, refusing to leave the terminal stage or move backwards
    fn determine_target_order(&self) -> LifecycleResult<u32> {
        let current = self.instance.current_stage_order;
        if self.entry.is_final(current) {
            return Err(LifecycleError::AlreadyAtFinalStage {
                stage_id: self.instance.current_stage_id.clone(),
            });
        }
        let target = current + 1;
        ensure_forward(current, target)?;
        Ok(target)
    }

    fn archive(&mut self, now: DateTime<Utc>) {
        self.instance.state = EnrollmentState::Archived;
        self.instance.archived_at = Some(now);
    }

    pub fn instance(&self) -> &LifecycleInstance {
        self.instance
    }
}

/// Stage order may stay put or grow, never shrink
pub fn ensure_forward(from: u32, to: u32) -> LifecycleResult<()> {
    if to < from {
        return Err(LifecycleError::StageRegression { from, to });
    }
    Ok(())
}
