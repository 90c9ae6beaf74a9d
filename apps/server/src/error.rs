//! # API Error Types
//!
//! What clients see when something goes wrong.
//!
//! ## Error Flow
//! ```text
//! CoreError / DbError
//!      │
//!      ▼
//! ApiError { code, message }   ← this module
//!      │
//!      ▼
//! HTTP response: status + {"error": {"code": "...", "message": "..."}}
//! ```
//!
//! ## Status Mapping
//! ```text
//! NotFound            → 404
//! Conflict            → 409
//! InvalidInput        → 400
//! InvalidCredentials  → 401
//! Forbidden           → 403
//! Internal            → 500
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use baraholka_core::CoreError;
use baraholka_db::DbError;

/// Machine-readable failure kind, serialized in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    Conflict,
    InvalidInput,
    InvalidCredentials,
    Forbidden,
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API-level error, rendered as a JSON body with the matching status.
#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidInput, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: ErrorCode,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();

        // Internal failures are logged in full; the client gets a generic line
        let message = if self.code == ErrorCode::Internal {
            error!(message = %self.message, "Internal error");
            "Internal server error".to_string()
        } else {
            self.message
        };

        let body = Json(ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &message,
            },
        });

        (status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ItemNotFound(_)
            | CoreError::UserNotFound(_)
            | CoreError::CategoryNotFound(_) => ErrorCode::NotFound,

            CoreError::DuplicatePhone { .. }
            | CoreError::DuplicateCategory { .. }
            | CoreError::DuplicateSubcategory { .. }
            | CoreError::AlreadyBooked { .. } => ErrorCode::Conflict,

            CoreError::OwnBooking { .. }
            | CoreError::NotBooker { .. }
            | CoreError::NotOwner { .. } => ErrorCode::Forbidden,

            CoreError::InvalidCredentials => ErrorCode::InvalidCredentials,

            CoreError::Validation(_) => ErrorCode::InvalidInput,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::conflict(err.to_string()),
            _ => ApiError::internal(err.to_string()),
        }
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================
