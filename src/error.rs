use thiserror::Error;

use crate::state_machine::errors::LifecycleError;

/// Crate-wide error taxonomy.
///
/// Domain failures (`NotFound`, `InvalidTransition`) are always returned to the
/// caller. `UpstreamUnavailable` is produced by the external collaborators and is
/// converted into an absent section by the dashboard aggregator rather than
/// propagated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropMindError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl CropMindError {
    /// Short machine-readable name used in API bodies and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::ValidationError(_) => "validation_error",
            Self::ConfigurationError(_) => "configuration_error",
            Self::DatabaseError(_) => "database_error",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<LifecycleError> for CropMindError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InstanceNotFound { .. } | LifecycleError::UnknownCropType { .. } => {
                Self::NotFound(err.to_string())
            }
            LifecycleError::TaskNotFound { .. }
            | LifecycleError::AlreadyAtFinalStage { .. }
            | LifecycleError::NotAtFinalStage { .. }
            | LifecycleError::StageRegression { .. }
            | LifecycleError::StageTasksIncomplete { .. } => Self::InvalidTransition(err.to_string()),
        }
    }
}

impl From<crate::gateways::UpstreamError> for CropMindError {
    fn from(err: crate::gateways::UpstreamError) -> Self {
        Self::UpstreamUnavailable(err.to_string())
    }
}

impl From<crate::config::ConfigurationError> for CropMindError {
    fn from(err: crate::config::ConfigurationError) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for CropMindError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CropMindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_errors_map_to_taxonomy() {
        let err: CropMindError = LifecycleError::AlreadyAtFinalStage {
            stage_id: "harvest".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "invalid_transition");

        let err: CropMindError = LifecycleError::InstanceNotFound {
            farmer: "a@b.c".to_string(),
        }
        .into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = CropMindError::ValidationError("crop is required".to_string());
        assert_eq!(err.to_string(), "Validation error: crop is required");
    }
}
