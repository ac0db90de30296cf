/// Error handling for the API server
///
/// All handlers return `Result<T, ApiError>`. Core errors convert through
/// [`From<CoreError>`] so a handler can use `?` on any service call:
///
/// | Core kind    | Status |
/// |--------------|--------|
/// | Validation   | 422    |
/// | Conflict     | 409    |
/// | Auth         | 401    |
/// | NotFound     | 404    |
/// | Store        | 500    |
///
/// 500 responses never carry the underlying error; it is logged instead.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use socialnet_shared::{CoreError, FieldViolation};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate email, existing friendship
    Conflict(String),

    /// Payload too large (413) - oversized upload
    PayloadTooLarge(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<FieldViolation>),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg, None)
            }
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Request validation failed".to_string()),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert core errors to API errors
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(violations) => ApiError::ValidationError(violations),
            CoreError::Conflict(msg) => ApiError::Conflict(msg),
            CoreError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            CoreError::Token(e) => ApiError::Unauthorized(e.to_string()),
            CoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::Store(e) => ApiError::InternalError(format!("Store error: {}", e)),
            CoreError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert multipart errors to API errors
impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialnet_shared::StoreError;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_core_error_status_mapping() {
        let cases = [
            (
                CoreError::invalid("username", "Username must be between 4 and 20 characters"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::Conflict("Already friends".to_string()),
                StatusCode::CONFLICT,
            ),
            (CoreError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (CoreError::NotFound("User"), StatusCode::NOT_FOUND),
            (
                CoreError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (core, status) in cases {
            let response = ApiError::from(core).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_store_errors_are_not_exposed() {
        let err = ApiError::from(CoreError::Store(StoreError::CheckViolation(
            "friendships_no_self".to_string(),
        )));

        match err {
            ApiError::InternalError(detail) => assert!(detail.contains("friendships_no_self")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
