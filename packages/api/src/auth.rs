// ABOUTME: Caller identity for API requests
// ABOUTME: Reads the subject asserted by the authenticating gateway from a request header

use axum::{extract::FromRequestParts, http::request::Parts};
use juststart_security::Identity;

use crate::error::AppError;

/// Header set by the gateway after it has verified the session
pub const IDENTITY_HEADER: &str = "x-identity-subject";

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let subject = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(Self(Identity::new(subject)))
    }
}
