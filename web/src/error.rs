//! Error types for web handlers.
//!
//! This module bridges the engine's error taxonomy to HTTP responses,
//! implementing Axum's `IntoResponse` trait:
//!
//! | Engine error | Status | Code |
//! |---|---|---|
//! | `Validation` | 422 | `VALIDATION_ERROR` |
//! | `Conflict`   | 409 | `CONFLICT` |
//! | `Capacity`   | 409 | `CAPACITY_EXCEEDED` |
//! | `Store`      | 503 | `STORE_UNAVAILABLE` |
//! | `Notify`     | 503 | `NOTIFIER_UNAVAILABLE` |
//!
//! "Queue empty" is *not* here - an empty queue is a normal `call_next`
//! outcome and ships as a 200 with a null token.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use janseva_core::QueueError;
use serde::Serialize;

/// Application error type for web handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: &'static str,
}

impl ApiError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
        }
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// The HTTP status this error renders as.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<QueueError> for ApiError {
    fn from(error: QueueError) -> Self {
        match &error {
            QueueError::Validation(_) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                error.to_string(),
                "VALIDATION_ERROR",
            ),
            QueueError::Conflict(_) => {
                Self::new(StatusCode::CONFLICT, error.to_string(), "CONFLICT")
            }
            QueueError::Capacity { .. } => Self::new(
                StatusCode::CONFLICT,
                error.to_string(),
                "CAPACITY_EXCEEDED",
            ),
            QueueError::Store(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "storage temporarily unavailable".to_string(),
                "STORE_UNAVAILABLE",
            ),
            QueueError::Notify(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "change notifications temporarily unavailable".to_string(),
                "NOTIFIER_UNAVAILABLE",
            ),
        }
    }
}

/// Wire shape of an error payload.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "request failed");
        } else {
            tracing::debug!(code = self.code, message = %self.message, "request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
