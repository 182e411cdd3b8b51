//! # Web API Error Types
//!
//! HTTP-facing error type and its response conversion. Every error body has
//! the shape `{"error": <code>, "message": <text>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::CropMindError;
use crate::logging::log_error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid transition: {message}")]
    InvalidTransition { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Internal server error")]
    Internal { message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::BadRequest { .. } => "validation_error",
            Self::ServiceUnavailable { .. } => "upstream_unavailable",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl From<CropMindError> for ApiError {
    fn from(err: CropMindError) -> Self {
        match err {
            CropMindError::NotFound(message) => Self::NotFound { message },
            CropMindError::InvalidTransition(message) => Self::InvalidTransition { message },
            CropMindError::ValidationError(message) => Self::BadRequest { message },
            CropMindError::UpstreamUnavailable(message) => Self::ServiceUnavailable { message },
            CropMindError::ConfigurationError(message) | CropMindError::DatabaseError(message) => {
                Self::Internal { message }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Internal detail stays in the logs
            Self::Internal { message } => {
                log_error("web", "request", message, None);
                "Internal server error".to_string()
            }
            Self::NotFound { message }
            | Self::InvalidTransition { message }
            | Self::BadRequest { message }
            | Self::ServiceUnavailable { message } => message.clone(),
        };

        let body = json!({
            "error": self.error_code(),
            "message": message,
        });
        (self.status_code(), Json(body)).into_response()
    }
}
