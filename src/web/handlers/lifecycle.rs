//! # Lifecycle Handlers
//!
//! Status read and the mutating lifecycle operations. The farmer is
//! identified by [`FarmerContext`].

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{LifecycleInstance, LifecycleStatusView, Task};
use crate::web::context::FarmerContext;
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    pub message: String,
    pub lifecycle_id: i64,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ArchiveResponse {
    fn new(message: &str, instance: LifecycleInstance) -> Self {
        Self {
            message: message.to_string(),
            lifecycle_id: instance.instance_id,
            archived_at: instance.archived_at,
        }
    }
}

/// GET /lifecycle/status
pub async fn get_status(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<LifecycleStatusView>> {
    let view = state.services.lifecycle.status(&farmer.email).await?;
    Ok(Json(view))
}

/// POST /lifecycle/tasks/{task_id}/toggle
pub async fn toggle_task(
    State(state): State<AppState>,
    farmer: FarmerContext,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = state
        .services
        .lifecycle
        .toggle_task(&farmer.email, task_id)
        .await?;
    Ok(Json(task))
}

/// POST /lifecycle/advance
pub async fn advance_stage(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<LifecycleStatusView>> {
    let view = state.services.lifecycle.advance_stage(&farmer.email).await?;
    Ok(Json(view))
}

/// POST /lifecycle/complete
pub async fn complete(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<ArchiveResponse>> {
    let instance = state.services.lifecycle.complete(&farmer.email).await?;
    Ok(Json(ArchiveResponse::new("Lifecycle completed", instance)))
}

/// DELETE /lifecycle
pub async fn disenroll(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<ArchiveResponse>> {
    let instance = state.services.lifecycle.disenroll(&farmer.email).await?;
    Ok(Json(ArchiveResponse::new("Lifecycle archived", instance)))
}
