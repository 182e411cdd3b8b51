//! # Onboarding Handlers

use axum::extract::State;
use axum::Json;

use crate::services::{OnboardingRequest, OnboardingResult};
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// POST /onboarding/setup
pub async fn setup(
    State(state): State<AppState>,
    Json(request): Json<OnboardingRequest>,
) -> ApiResult<Json<OnboardingResult>> {
    let result = state.services.onboarding.setup(request).await?;
    Ok(Json(result))
}
