//! Caller role extraction.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::rest::error::ApiError;
use crate::roles::{Capability, Role, ROLE_HEADER};

/// Role supplied by the identity layer in front of the API.
///
/// Requests without the header are treated as patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerRole(pub Role);

impl CallerRole {
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        if self.0.allows(capability) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "role '{}' may not perform this operation",
                self.0
            )))
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CallerRole {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ROLE_HEADER) else {
            return Ok(CallerRole(Role::Patient));
        };
        let value = value
            .to_str()
            .map_err(|_| ApiError::BadRequest(format!("{} header is not text", ROLE_HEADER)))?;
        value
            .parse::<Role>()
            .map(CallerRole)
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}
