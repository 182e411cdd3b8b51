//! Farmer identity extraction.
//!
//! Identity is the farmer's email, taken from the `email` query parameter or,
//! failing that, the `X-Farmer-Email` header. Authentication happens upstream
//! of this service.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::web::errors::ApiError;

pub const FARMER_EMAIL_HEADER: &str = "x-farmer-email";

#[derive(Debug, Deserialize)]
struct EmailQuery {
    email: Option<String>,
}

/// Email of the farmer a request acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmerContext {
    pub email: String,
}

impl FarmerContext {
    fn from_parts(parts: &Parts) -> Option<Self> {
        let from_query = Query::<EmailQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.email);
        let from_header = || {
            parts
                .headers
                .get(FARMER_EMAIL_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        from_query
            .or_else(from_header)
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .map(|email| Self { email })
    }
}

impl<S> FromRequestParts<S> for FarmerContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts).ok_or_else(|| {
            ApiError::bad_request("farmer email is required (?email= or X-Farmer-Email)")
        })
    }
}

/// Like [`FarmerContext`] but never rejects; for bodies that may carry the email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalFarmerContext(pub Option<FarmerContext>);

impl<S> FromRequestParts<S> for OptionalFarmerContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(FarmerContext::from_parts(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(email) = header {
            builder = builder.header(FARMER_EMAIL_HEADER, email);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_query_wins_over_header() {
        let ctx = FarmerContext::from_parts(&parts("/x?email=a%40b.in", Some("c@d.in"))).unwrap();
        assert_eq!(ctx.email, "a@b.in");
    }

    #[test]
    fn test_header_fallback_and_missing() {
        let ctx = FarmerContext::from_parts(&parts("/x", Some("c@d.in"))).unwrap();
        assert_eq!(ctx.email, "c@d.in");
        assert!(FarmerContext::from_parts(&parts("/x?email=", None)).is_none());
        assert!(FarmerContext::from_parts(&parts("/x", None)).is_none());
    }
}
