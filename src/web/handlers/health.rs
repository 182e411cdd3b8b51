//! # Health Check Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::utils::Clock;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub environment: String,
    pub storage: String,
}

/// Welcome message: GET /
pub async fn welcome(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {} API", state.config.defaults.app_name),
    })
}

/// Liveness plus store connectivity: GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = &state.services.context.store;
    let (status_code, status) = match store.health_check().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            error!(error = %e, "Store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            timestamp: state.services.context.clock.now().to_rfc3339(),
            environment: state.config.environment.clone(),
            storage: store.backend_name().to_string(),
        }),
    )
}
