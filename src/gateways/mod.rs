//! # Upstream Collaborators
//!
//! Weather and advisory services reached over HTTP. Both are treated as
//! unreliable: every call is bounded in time and failures surface as
//! [`UpstreamError`] for the caller to degrade around.

pub mod advisory;
pub mod weather;

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub use advisory::{
    ActionRequest, AdvisoryGateway, ChatCompletionsGateway, DisabledAdvisoryGateway,
};
pub use weather::{
    CachedWeatherProvider, OpenWeatherMapProvider, StaticWeatherProvider, WeatherLocation,
    WeatherProvider,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    #[error("{service} did not answer within {after_ms}ms")]
    Timeout { service: String, after_ms: u64 },

    #[error("{service} returned an invalid response: {reason}")]
    InvalidResponse { service: String, reason: String },

    #[error("{service} is not configured")]
    NotConfigured { service: String },
}

impl UpstreamError {
    pub fn unavailable(service: &str, reason: impl ToString) -> Self {
        Self::Unavailable {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_response(service: &str, reason: impl ToString) -> Self {
        Self::InvalidResponse {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn not_configured(service: &str) -> Self {
        Self::NotConfigured {
            service: service.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Run an upstream call with an upper time bound
pub async fn bounded<T, F>(service: &str, limit: Duration, call: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout {
            service: service.to_string(),
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: Result<(), UpstreamError> = bounded("advisory", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;
        assert_eq!(
            result.unwrap_err(),
            UpstreamError::Timeout {
                service: "advisory".to_string(),
                after_ms: 10
            }
        );
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let result = bounded("weather", Duration::from_secs(1), async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
