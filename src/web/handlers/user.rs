//! # User Profile Handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::ProfileUpdate;
use crate::services::ProfileView;
use crate::web::context::{FarmerContext, OptionalFarmerContext};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Body of `PUT /user/profile`; the email may come from the body instead of
/// the query string or header
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub update: ProfileUpdate,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub email: String,
    pub profile: ProfileView,
}

/// GET /user/profile
pub async fn get_profile(
    State(state): State<AppState>,
    farmer: FarmerContext,
) -> ApiResult<Json<ProfileView>> {
    let profile = state.services.profile.profile(&farmer.email).await?;
    Ok(Json(profile))
}

/// PUT /user/profile
pub async fn update_profile(
    State(state): State<AppState>,
    OptionalFarmerContext(farmer): OptionalFarmerContext,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileUpdateResponse>> {
    let email = request
        .email
        .filter(|email| !email.trim().is_empty())
        .or(farmer.map(|f| f.email))
        .ok_or_else(|| ApiError::bad_request("farmer email is required"))?;

    let profile = state
        .services
        .profile
        .update_profile(&email, request.update)
        .await?;
    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        email,
        profile,
    }))
}
