use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::FarmStore;
use crate::database::DatabaseConnection;
use crate::error::{CropMindError, Result};
use crate::models::{
    AdviceRecord, Alert, AlertKind, AlertSeverity, FarmDetails, FarmerProfile, LifecycleInstance,
    NewAdviceRecord, NewAlert, NewLifecycleInstance, Task,
};
use crate::state_machine::EnrollmentState;

/// PostgreSQL-backed store. Multi-row writes run in one transaction.
#[derive(Debug, Clone)]
pub struct PgFarmStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct FarmerRow {
    email: String,
    name: Option<String>,
    preferred_language: Option<String>,
    created_at: DateTime<Utc>,
    crop_type: Option<String>,
    sowing_date: Option<NaiveDate>,
    state: Option<String>,
    district: Option<String>,
    village: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<FarmerRow> for FarmerProfile {
    fn from(row: FarmerRow) -> Self {
        let farm = match (row.crop_type, row.sowing_date) {
            (Some(crop_type), Some(sowing_date)) => Some(FarmDetails {
                crop_type,
                sowing_date,
                state: row.state.unwrap_or_default(),
                district: row.district.unwrap_or_default(),
                village: row.village.unwrap_or_default(),
                latitude: row.latitude,
                longitude: row.longitude,
            }),
            _ => None,
        };
        FarmerProfile {
            email: row.email,
            name: row.name,
            preferred_language: row.preferred_language,
            farm,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LifecycleRow {
    instance_id: i64,
    farmer_email: String,
    crop_type: String,
    sowing_date: NaiveDate,
    current_stage_id: String,
    current_stage_order: i32,
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
}

impl LifecycleRow {
    fn into_instance(self, tasks: Vec<Task>) -> Result<LifecycleInstance> {
        let state: EnrollmentState = self
            .state
            .parse()
            .map_err(CropMindError::DatabaseError)?;
        let current_stage_order = u32::try_from(self.current_stage_order).map_err(|_| {
            CropMindError::DatabaseError(format!(
                "negative stage order {} for lifecycle {}",
                self.current_stage_order, self.instance_id
            ))
        })?;
        Ok(LifecycleInstance {
            instance_id: self.instance_id,
            farmer_email: self.farmer_email,
            crop_type: self.crop_type,
            sowing_date: self.sowing_date,
            current_stage_id: self.current_stage_id,
            current_stage_order,
            state,
            tasks,
            created_at: self.created_at,
            updated_at: self.updated_at,
            archived_at: self.archived_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AlertRow {
    id: i64,
    kind: String,
    message: String,
    severity: String,
    created_at: DateTime<Utc>,
}

impl From<AlertRow> for Alert {
    fn from(row: AlertRow) -> Self {
        Alert {
            id: row.id,
            kind: AlertKind::from_tag(&row.kind),
            message: row.message,
            severity: AlertSeverity::from_tag(&row.severity),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AdviceRow {
    id: i64,
    farmer_email: String,
    recommendation: String,
    stage_at_time: Option<String>,
    weather_summary: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AdviceRow> for AdviceRecord {
    fn from(row: AdviceRow) -> Self {
        AdviceRecord {
            id: row.id,
            farmer_email: row.farmer_email,
            recommendation: row.recommendation,
            stage_at_time: row.stage_at_time,
            weather_summary: row.weather_summary,
            created_at: row.created_at,
        }
    }
}

const LIFECYCLE_COLUMNS: &str = "instance_id, farmer_email, crop_type, sowing_date, \
     current_stage_id, current_stage_order, state, created_at, updated_at, archived_at";

impl PgFarmStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_connection(connection: &DatabaseConnection) -> Self {
        Self::new(connection.pool().clone())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_tasks(&self, instance_id: i64) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT task_id AS id, stage_id, task_name, is_completed
             FROM lifecycle_tasks
             WHERE instance_id = $1
             ORDER BY task_id",
        )
        .bind(instance_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }
}

fn map_unique_violation(err: sqlx::Error, farmer: &str) -> CropMindError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => CropMindError::InvalidTransition(
            format!("farmer {farmer} already has an active lifecycle"),
        ),
        _ => err.into(),
    }
}

#[async_trait]
impl FarmStore for PgFarmStore {
    async fn get_farmer(&self, email: &str) -> Result<Option<FarmerProfile>> {
        let row = sqlx::query_as::<_, FarmerRow>(
            "SELECT f.email, f.name, f.preferred_language, f.created_at,
                    fa.crop_type, fa.sowing_date, fa.state, fa.district, fa.village,
                    fa.latitude, fa.longitude
             FROM farmers f
             LEFT JOIN farms fa ON fa.farmer_email = f.email
             WHERE f.email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FarmerProfile::from))
    }

    async fn upsert_farmer(&self, profile: &FarmerProfile) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO farmers (email, name, preferred_language, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email) DO UPDATE
             SET name = EXCLUDED.name, preferred_language = EXCLUDED.preferred_language",
        )
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.preferred_language)
        .bind(profile.created_at)
        .execute(&mut *tx)
        .await?;

        match &profile.farm {
            Some(farm) => {
                sqlx::query(
                    "INSERT INTO farms (farmer_email, crop_type, sowing_date, state, district,
                                        village, latitude, longitude)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                     ON CONFLICT (farmer_email) DO UPDATE
                     SET crop_type = EXCLUDED.crop_type, sowing_date = EXCLUDED.sowing_date,
                         state = EXCLUDED.state, district = EXCLUDED.district,
                         village = EXCLUDED.village, latitude = EXCLUDED.latitude,
                         longitude = EXCLUDED.longitude",
                )
                .bind(&profile.email)
                .bind(&farm.crop_type)
                .bind(farm.sowing_date)
                .bind(&farm.state)
                .bind(&farm.district)
                .bind(&farm.village)
                .bind(farm.latitude)
                .bind(farm.longitude)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM farms WHERE farmer_email = $1")
                    .bind(&profile.email)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn active_lifecycle(&self, email: &str) -> Result<Option<LifecycleInstance>> {
        let row = sqlx::query_as::<_, LifecycleRow>(&format!(
            "SELECT {LIFECYCLE_COLUMNS} FROM lifecycle_instances
             WHERE farmer_email = $1 AND state = 'active'"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let tasks = self.load_tasks(row.instance_id).await?;
                row.into_instance(tasks).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn create_lifecycle(
        &self,
        new: NewLifecycleInstance,
        now: DateTime<Utc>,
    ) -> Result<LifecycleInstance> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, LifecycleRow>(&format!(
            "INSERT INTO lifecycle_instances
                 (farmer_email, crop_type, sowing_date, current_stage_id, current_stage_order,
                  state, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, 'active', $6, $6)
             RETURNING {LIFECYCLE_COLUMNS}"
        ))
        .bind(&new.farmer_email)
        .bind(&new.crop_type)
        .bind(new.sowing_date)
        .bind(&new.current_stage_id)
        .bind(new.current_stage_order as i32)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &new.farmer_email))?;

        let ids: Vec<i64> = new.tasks.iter().map(|t| t.id).collect();
        let stages: Vec<String> = new.tasks.iter().map(|t| t.stage_id.clone()).collect();
        let names: Vec<String> = new.tasks.iter().map(|t| t.task_name.clone()).collect();
        let flags: Vec<bool> = new.tasks.iter().map(|t| t.is_completed).collect();

        sqlx::query(
            "INSERT INTO lifecycle_tasks (instance_id, task_id, stage_id, task_name, is_completed)
             SELECT $1, * FROM UNNEST($2::BIGINT[], $3::TEXT[], $4::TEXT[], $5::BOOLEAN[])",
        )
        .bind(row.instance_id)
        .bind(&ids)
        .bind(&stages)
        .bind(&names)
        .bind(&flags)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            instance_id = row.instance_id,
            task_count = new.tasks.len(),
            "Lifecycle persisted"
        );
        row.into_instance(new.tasks)
    }

    async fn save_lifecycle(&self, instance: &LifecycleInstance) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE lifecycle_instances
             SET current_stage_id = $2, current_stage_order = $3, state = $4,
                 updated_at = $5, archived_at = $6
             WHERE instance_id = $1",
        )
        .bind(instance.instance_id)
        .bind(&instance.current_stage_id)
        .bind(instance.current_stage_order as i32)
        .bind(instance.state.to_string())
        .bind(instance.updated_at)
        .bind(instance.archived_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CropMindError::NotFound(format!(
                "lifecycle {}",
                instance.instance_id
            )));
        }

        let ids: Vec<i64> = instance.tasks.iter().map(|t| t.id).collect();
        let flags: Vec<bool> = instance.tasks.iter().map(|t| t.is_completed).collect();
        sqlx::query(
            "UPDATE lifecycle_tasks t
             SET is_completed = u.is_completed
             FROM UNNEST($2::BIGINT[], $3::BOOLEAN[]) AS u(task_id, is_completed)
             WHERE t.instance_id = $1 AND t.task_id = u.task_id",
        )
        .bind(instance.instance_id)
        .bind(&ids)
        .bind(&flags)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn record_alert(&self, alert: NewAlert, now: DateTime<Utc>) -> Result<Alert> {
        let row = sqlx::query_as::<_, AlertRow>(
            "INSERT INTO alerts (farmer_email, kind, message, severity, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, kind, message, severity, created_at",
        )
        .bind(&alert.farmer_email)
        .bind(alert.kind.to_string())
        .bind(&alert.message)
        .bind(alert.severity.to_string())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn alerts_for(&self, email: &str) -> Result<Vec<Alert>> {
        let rows = sqlx::query_as::<_, AlertRow>(
            "SELECT id, kind, message, severity, created_at
             FROM alerts
             WHERE farmer_email = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Alert::from).collect())
    }

    async fn record_advice(
        &self,
        advice: NewAdviceRecord,
        now: DateTime<Utc>,
    ) -> Result<AdviceRecord> {
        let row = sqlx::query_as::<_, AdviceRow>(
            "INSERT INTO advice_history
                 (farmer_email, recommendation, stage_at_time, weather_summary, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, farmer_email, recommendation, stage_at_time, weather_summary, created_at",
        )
        .bind(&advice.farmer_email)
        .bind(&advice.recommendation)
        .bind(&advice.stage_at_time)
        .bind(&advice.weather_summary)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn recent_advice(&self, email: &str, limit: usize) -> Result<Vec<AdviceRecord>> {
        let mut rows = sqlx::query_as::<_, AdviceRow>(
            "SELECT id, farmer_email, recommendation, stage_at_time, weather_summary, created_at
             FROM advice_history
             WHERE farmer_email = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(email)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        rows.reverse();
        Ok(rows.into_iter().map(AdviceRecord::from).collect())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
