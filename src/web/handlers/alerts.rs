//! # Alert Handlers

use axum::extract::State;
use axum::Json;

use crate::models::Alert;
use crate::web::context::FarmerContext;
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// GET /alerts/ (newest first)
pub async fn list_alerts(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<Vec<Alert>>> {
    let alerts = state.services.alerts.list(&farmer.email).await?;
    Ok(Json(alerts))
}
