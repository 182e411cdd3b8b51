//! # Farm Store
//!
//! Persistence boundary for farmers, lifecycle instances with their tasks,
//! alerts and advice history. The service layer holds the per-farmer lock
//! across load, mutate and save; stores only need each call to be atomic.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    AdviceRecord, Alert, FarmerProfile, LifecycleInstance, NewAdviceRecord, NewAlert,
    NewLifecycleInstance,
};

pub use memory::InMemoryFarmStore;
#[cfg(feature = "postgres")]
pub use postgres::PgFarmStore;

#[async_trait]
pub trait FarmStore: Send + Sync {
    async fn get_farmer(&self, email: &str) -> Result<Option<FarmerProfile>>;

    /// Insert or replace the farmer, including the farm profile
    async fn upsert_farmer(&self, profile: &FarmerProfile) -> Result<()>;

    /// The farmer's single non-archived lifecycle, if any
    async fn active_lifecycle(&self, email: &str) -> Result<Option<LifecycleInstance>>;

    /// Persist a new lifecycle and its tasks, assigning the instance id
    async fn create_lifecycle(
        &self,
        new: NewLifecycleInstance,
        now: DateTime<Utc>,
    ) -> Result<LifecycleInstance>;

    /// Write back stage, state and task flags of an existing lifecycle
    async fn save_lifecycle(&self, instance: &LifecycleInstance) -> Result<()>;

    async fn record_alert(&self, alert: NewAlert, now: DateTime<Utc>) -> Result<Alert>;

    /// Newest first
    async fn alerts_for(&self, email: &str) -> Result<Vec<Alert>>;

    async fn record_advice(&self, advice: NewAdviceRecord, now: DateTime<Utc>)
        -> Result<AdviceRecord>;

    /// The latest `limit` entries, oldest first
    async fn recent_advice(&self, email: &str, limit: usize) -> Result<Vec<AdviceRecord>>;

    async fn health_check(&self) -> Result<()>;

    /// Backend name for health output
    fn backend_name(&self) -> &'static str;
}
