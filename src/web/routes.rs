//! # Web API Routes
//!
//! Route table plus the cross-cutting layers: CORS, request tracing and a
//! request timeout.

use axum::http::{HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;
use crate::web::{handlers, state::AppState};

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::welcome))
        .route("/health", get(handlers::health::health_check))
}

pub fn lifecycle_routes() -> Router<AppState> {
    Router::new()
        .route("/lifecycle", axum::routing::delete(handlers::lifecycle::disenroll))
        .route("/lifecycle/status", get(handlers::lifecycle::get_status))
        .route(
            "/lifecycle/tasks/{task_id}/toggle",
            post(handlers::lifecycle::toggle_task),
        )
        .route("/lifecycle/advance", post(handlers::lifecycle::advance_stage))
        .route("/lifecycle/complete", post(handlers::lifecycle::complete))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/dashboard/weather", get(handlers::dashboard::get_weather))
        .route("/dashboard/user-info", get(handlers::dashboard::get_user_info))
}

pub fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user/profile",
            get(handlers::user::get_profile).put(handlers::user::update_profile),
        )
        .route("/chat/query", post(handlers::chat::query))
        .route("/alerts", get(handlers::alerts::list_alerts))
        .route("/alerts/", get(handlers::alerts::list_alerts))
        .route("/onboarding/setup", post(handlers::onboarding::setup))
}

/// Full application router with layers applied
pub fn create_router(state: AppState) -> Router {
    let server = state.config.server.clone();
    Router::new()
        .merge(health_routes())
        .merge(lifecycle_routes())
        .merge(dashboard_routes())
        .merge(farmer_routes())
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(&server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if server.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
