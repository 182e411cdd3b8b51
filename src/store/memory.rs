use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use super::FarmStore;
use crate::error::{CropMindError, Result};
use crate::models::{
    AdviceRecord, Alert, FarmerProfile, LifecycleInstance, NewAdviceRecord, NewAlert,
    NewLifecycleInstance,
};

/// Process-local store used by tests and the `memory` backend
#[derive(Debug, Default)]
pub struct InMemoryFarmStore {
    farmers: DashMap<String, FarmerProfile>,
    lifecycles: DashMap<i64, LifecycleInstance>,
    /// farmer email -> active instance id
    active: DashMap<String, i64>,
    alerts: DashMap<String, Vec<Alert>>,
    advice: DashMap<String, Vec<AdviceRecord>>,
    next_id: AtomicI64,
}

impl InMemoryFarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Every instance ever created for a farmer, archived ones included
    pub fn lifecycle_history(&self, email: &str) -> Vec<LifecycleInstance> {
        let mut instances: Vec<LifecycleInstance> = self
            .lifecycles
            .iter()
            .filter(|entry| entry.farmer_email == email)
            .map(|entry| entry.value().clone())
            .collect();
        instances.sort_by_key(|i| i.instance_id);
        instances
    }
}

#[async_trait]
impl FarmStore for InMemoryFarmStore {
    async fn get_farmer(&self, email: &str) -> Result<Option<FarmerProfile>> {
        Ok(self.farmers.get(email).map(|f| f.value().clone()))
    }

    async fn upsert_farmer(&self, profile: &FarmerProfile) -> Result<()> {
        self.farmers.insert(profile.email.clone(), profile.clone());
        Ok(())
    }

    async fn active_lifecycle(&self, email: &str) -> Result<Option<LifecycleInstance>> {
        let Some(instance_id) = self.active.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self
            .lifecycles
            .get(&instance_id)
            .map(|i| i.value().clone())
            .filter(|i| i.is_active()))
    }

    async fn create_lifecycle(
        &self,
        new: NewLifecycleInstance,
        now: DateTime<Utc>,
    ) -> Result<LifecycleInstance> {
        if let Some(existing) = self.active.get(&new.farmer_email) {
            let still_active = self
                .lifecycles
                .get(existing.value())
                .is_some_and(|i| i.is_active());
            if still_active {
                return Err(CropMindError::InvalidTransition(format!(
                    "farmer {} already has an active lifecycle",
                    new.farmer_email
                )));
            }
        }

        let instance = new.into_instance(self.next_id(), now);
        self.active
            .insert(instance.farmer_email.clone(), instance.instance_id);
        self.lifecycles.insert(instance.instance_id, instance.clone());
        Ok(instance)
    }

    async fn save_lifecycle(&self, instance: &LifecycleInstance) -> Result<()> {
        let mut stored = self.lifecycles.get_mut(&instance.instance_id).ok_or_else(|| {
            CropMindError::NotFound(format!("lifecycle {}", instance.instance_id))
        })?;
        *stored = instance.clone();
        drop(stored);

        if !instance.is_active() {
            self.active
                .remove_if(&instance.farmer_email, |_, id| *id == instance.instance_id);
        }
        Ok(())
    }

    async fn record_alert(&self, alert: NewAlert, now: DateTime<Utc>) -> Result<Alert> {
        let stored = Alert {
            id: self.next_id(),
            kind: alert.kind,
            message: alert.message,
            severity: alert.severity,
            created_at: now,
        };
        self.alerts
            .entry(alert.farmer_email)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn alerts_for(&self, email: &str) -> Result<Vec<Alert>> {
        let mut alerts = self
            .alerts
            .get(email)
            .map(|a| a.value().clone())
            .unwrap_or_default();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(alerts)
    }

    async fn record_advice(
        &self,
        advice: NewAdviceRecord,
        now: DateTime<Utc>,
    ) -> Result<AdviceRecord> {
        let stored = AdviceRecord {
            id: self.next_id(),
            farmer_email: advice.farmer_email,
            recommendation: advice.recommendation,
            stage_at_time: advice.stage_at_time,
            weather_summary: advice.weather_summary,
            created_at: now,
        };
        self.advice
            .entry(stored.farmer_email.clone())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn recent_advice(&self, email: &str, limit: usize) -> Result<Vec<AdviceRecord>> {
        let mut records = self
            .advice
            .get(email)
            .map(|a| a.value().clone())
            .unwrap_or_default();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let skip = records.len().saturating_sub(limit);
        Ok(records.split_off(skip))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
