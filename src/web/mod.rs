//! # Web API
//!
//! `axum` HTTP surface of the service: the farmer-facing contract consumed by
//! the CropMind front end.

pub mod context;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use context::FarmerContext;
pub use errors::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
