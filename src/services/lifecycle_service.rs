//! # Lifecycle Service
//!
//! Farmer-facing lifecycle operations: status reads, task toggles, stage
//! advances and archiving. Every mutation runs under the farmer's lock as
//! load, transition, save, so concurrent requests against one lifecycle can
//! never lose an update.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{AlertService, InstanceLocks, ServiceContext};
use crate::catalog::{CropCatalogEntry, StageCatalog};
use crate::constants::operations;
use crate::error::{CropMindError, Result};
use crate::gateways::{self, advisory::default_knowledge, ActionRequest, AdvisoryGateway};
use crate::logging::log_lifecycle_operation;
use crate::models::{LifecycleInstance, LifecycleStatusView, Task};
use crate::state_machine::{
    advance_guard, errors::instance_not_found, progress, AdvanceGuard, LifecycleEvent,
    LifecycleSnapshot, LifecycleStateMachine, TransitionOutcome,
};
use crate::store::FarmStore;
use crate::utils::Clock;

pub struct LifecycleService {
    store: Arc<dyn FarmStore>,
    catalog: Arc<StageCatalog>,
    advisory: Arc<dyn AdvisoryGateway>,
    clock: Arc<dyn Clock>,
    locks: Arc<InstanceLocks>,
    alerts: Arc<AlertService>,
    guard: Box<dyn AdvanceGuard>,
    advisory_timeout: Duration,
    history_limit: usize,
    default_language: String,
}

impl std::fmt::Debug for LifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleService")
            .field("guard", &self.guard.description())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

impl LifecycleService {
    pub fn new(
        context: &ServiceContext,
        locks: Arc<InstanceLocks>,
        alerts: Arc<AlertService>,
    ) -> Self {
        let config = &context.config;
        Self {
            store: Arc::clone(&context.store),
            catalog: Arc::clone(&context.catalog),
            advisory: Arc::clone(&context.advisory),
            clock: Arc::clone(&context.clock),
            locks,
            alerts,
            guard: advance_guard(config.lifecycle.require_stage_tasks_before_advance),
            advisory_timeout: config.advisory.timeout(),
            history_limit: config.defaults.history_limit,
            default_language: config.defaults.language.clone(),
        }
    }

    /// Full status view, including the best-effort stage summary and history
    #[instrument(skip(self))]
    pub async fn status(&self, email: &str) -> Result<LifecycleStatusView> {
        let instance = self.active_instance(email).await?;
        let entry = self.catalog.entry(&instance.crop_type)?;

        let stage_label = entry
            .stage_at(instance.current_stage_order)
            .map(|stage| stage.label.clone())
            .unwrap_or_else(|| instance.current_stage_id.clone());
        let ai_summary = self.stage_summary(email, entry, &stage_label).await;

        let history = self
            .store
            .recent_advice(email, self.history_limit)
            .await?
            .into_iter()
            .map(|record| record.recommendation)
            .collect();

        Ok(LifecycleStatusView::build(
            entry,
            &instance,
            self.clock.today(),
            ai_summary,
            history,
        ))
    }

    /// Derived metrics only, without calling any upstream service
    pub async fn snapshot(&self, email: &str) -> Result<LifecycleSnapshot> {
        let instance = self.active_instance(email).await?;
        let entry = self.catalog.entry(&instance.crop_type)?;
        Ok(progress::snapshot(entry, &instance, self.clock.today()))
    }

    /// The farmer's active lifecycle, or `NotFound`
    pub async fn active_instance(&self, email: &str) -> Result<LifecycleInstance> {
        let instance = self
            .store
            .active_lifecycle(email)
            .await?
            .ok_or_else(|| instance_not_found(email))?;
        Ok(instance)
    }

    #[instrument(skip(self))]
    pub async fn toggle_task(&self, email: &str, task_id: i64) -> Result<Task> {
        match self
            .mutate(email, operations::TOGGLE_TASK, LifecycleEvent::ToggleTask(task_id))
            .await?
        {
            (_, TransitionOutcome::TaskToggled(task)) => Ok(task),
            (_, other) => Err(CropMindError::InvalidTransition(format!(
                "toggle of task {task_id} produced {other:?}"
            ))),
        }
    }

    /// Move to the next stage and return the refreshed status view
    #[instrument(skip(self))]
    pub async fn advance_stage(&self, email: &str) -> Result<LifecycleStatusView> {
        let (instance, outcome) = self
            .mutate(email, operations::ADVANCE_STAGE, LifecycleEvent::AdvanceStage)
            .await?;

        if let TransitionOutcome::StageAdvanced { to_stage, .. } = outcome {
            let crop = self
                .catalog
                .entry(&instance.crop_type)
                .map(|entry| entry.display_name.clone())
                .unwrap_or_else(|_| instance.crop_type.clone());
            if let Err(e) = self
                .alerts
                .record_stage_entered(email, &crop, &to_stage.label)
                .await
            {
                warn!(farmer = %email, error = %e, "Failed to record stage alert");
            }
        }

        self.status(email).await
    }

    /// Archive a lifecycle that has reached its final stage
    #[instrument(skip(self))]
    pub async fn complete(&self, email: &str) -> Result<LifecycleInstance> {
        let (instance, _) = self
            .mutate(email, operations::COMPLETE, LifecycleEvent::Complete)
            .await?;
        Ok(instance)
    }

    #[instrument(skip(self))]
    pub async fn disenroll(&self, email: &str) -> Result<LifecycleInstance> {
        let (instance, _) = self
            .mutate(email, operations::DISENROLL, LifecycleEvent::Disenroll)
            .await?;
        Ok(instance)
    }

    async fn mutate(
        &self,
        email: &str,
        operation: &str,
        event: LifecycleEvent,
    ) -> Result<(LifecycleInstance, TransitionOutcome)> {
        let _lock = self.locks.acquire(email).await;

        let mut instance = self.active_instance(email).await?;
        let entry = self.catalog.entry(&instance.crop_type)?;

        let result = LifecycleStateMachine::with_guard(&mut instance, entry, self.guard.as_ref())
            .transition(event, self.clock.now());
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                log_lifecycle_operation(
                    operation,
                    email,
                    Some(instance.instance_id),
                    Some(&instance.current_stage_id),
                    "rejected",
                    Some(&e.to_string()),
                );
                return Err(e.into());
            }
        };

        self.store.save_lifecycle(&instance).await?;
        log_lifecycle_operation(
            operation,
            email,
            Some(instance.instance_id),
            Some(&instance.current_stage_id),
            "applied",
            None,
        );
        Ok((instance, outcome))
    }

    async fn stage_summary(
        &self,
        email: &str,
        entry: &CropCatalogEntry,
        stage_label: &str,
    ) -> Option<String> {
        let language = match self.store.get_farmer(email).await {
            Ok(Some(farmer)) => farmer.preferred_language,
            _ => None,
        }
        .filter(|language| !language.trim().is_empty())
        .unwrap_or_else(|| self.default_language.clone());

        let request = ActionRequest::daily(
            stage_label,
            "Not considered for the stage overview",
            default_knowledge(&entry.display_name, stage_label),
        )
        .with_question(format!(
            "Summarise the key priorities of the {stage_label} stage for {}.",
            entry.display_name
        ));

        match gateways::bounded(
            "advisory",
            self.advisory_timeout,
            self.advisory.advise(&request, &language),
        )
        .await
        {
            Ok(summary) => Some(summary),
            Err(e) => {
                debug!(farmer = %email, error = %e, "Stage summary unavailable");
                None
            }
        }
    }
}
