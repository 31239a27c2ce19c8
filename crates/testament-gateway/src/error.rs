//! # Gateway Errors
//!
//! [`ApiError`] is what handlers return: an HTTP status plus a JSON body.
//! Client faults (`400`, `404`) carry their reason; server faults log the
//! detail under a correlation id and return a generic message unless the
//! gateway runs in development mode.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;
use tracing::error;
use uuid::Uuid;

/// HTTP-facing error with a JSON body.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Body message.
    pub message: String,
}

impl ApiError {
    /// `400` — the identity parameter failed shape validation.
    pub fn invalid_identity(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("invalid identity: {}", detail.into()),
        }
    }

    /// `400` — the content hash parameter failed shape validation.
    pub fn invalid_hash(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("invalid content hash: {}", detail.into()),
        }
    }

    /// `404` — the resource does not exist in the replica.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("not found: {}", what.into()),
        }
    }

    /// `500` — unexpected failure. Logs the detail under a correlation id;
    /// the response carries the detail only in development mode.
    pub fn internal(dev_mode: bool, err: impl fmt::Display) -> Self {
        let error_id = Uuid::new_v4();
        error!(error_id = %error_id, error = %err, "Query failure");
        let message = if dev_mode {
            format!("internal error: {err}")
        } else {
            format!("internal error (ref {error_id})")
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Gateway-level errors (startup and config, not per-request).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error.
    #[error("server bind error: {0}")]
    Bind(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_carry_reason() {
        let err = ApiError::invalid_identity("missing 0x prefix");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("missing 0x prefix"));

        let err = ApiError::not_found("will 0xabc");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_hides_detail_outside_dev_mode() {
        let err = ApiError::internal(false, "disk on fire");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("disk on fire"));

        let err = ApiError::internal(true, "disk on fire");
        assert!(err.message.contains("disk on fire"));
    }
}
