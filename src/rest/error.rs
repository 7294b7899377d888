//! API error types and responses.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorKind, FieldErrors, JourneyError};

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Unknown step, patient or intake session
    NotFound(String),
    /// Field-level input errors
    ValidationFailed { message: String, fields: FieldErrors },
    /// Operation not legal in the current state
    InvalidTransition(String),
    /// A backing store rejected the write
    PersistenceFailed(String),
    /// Caller's role does not grant the operation
    Forbidden(String),
    /// Malformed request
    BadRequest(String),
    InternalError(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Field name to message, for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, fields) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationFailed { message, fields } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                message,
                Some(fields.into_map()),
            ),
            ApiError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "invalid_transition", msg, None)
            }
            ApiError::PersistenceFailed(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "persistence_failed",
                msg,
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg,
                None,
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
                fields,
            }),
        )
            .into_response()
    }
}

impl From<JourneyError> for ApiError {
    fn from(err: JourneyError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::InvalidTransition => ApiError::InvalidTransition(message),
            ErrorKind::PersistenceFailed => ApiError::PersistenceFailed(message),
            ErrorKind::ValidationFailed => ApiError::ValidationFailed {
                message,
                fields: err.field_errors().cloned().unwrap_or_default(),
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
