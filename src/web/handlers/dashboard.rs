//! # Dashboard Handlers

use axum::extract::State;
use axum::Json;

use crate::models::WeatherReport;
use crate::services::{DashboardSummary, UserInfo};
use crate::web::context::FarmerContext;
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// GET /dashboard/summary
///
/// Sections that fail are null and listed in `unavailable_sections`; only a
/// missing lifecycle turns the whole response into a 404.
pub async fn get_summary(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<DashboardSummary>> {
    let view = state.services.dashboard.aggregate(&farmer.email).await;
    Ok(Json(view.into_summary()?))
}

/// GET /dashboard/weather
pub async fn get_weather(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<WeatherReport>> {
    let report = state.services.weather.for_farmer(&farmer.email).await?;
    Ok(Json(report))
}

/// GET /dashboard/user-info
pub async fn get_user_info(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<UserInfo>> {
    let info = state.services.profile.user_info(&farmer.email).await?;
    Ok(Json(info))
}
