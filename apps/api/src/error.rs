//! # API Error Types
//!
//! What HTTP clients see when a request fails.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Source                               Status  Code                      │
//! │  ───────────────────────────────────  ──────  ───────────────────────   │
//! │  ValidationError, bad JSON/path/query  400    VALIDATION_ERROR          │
//! │  FK / CHECK constraint violation       400    VALIDATION_ERROR          │
//! │  ProductNotFound, DbError::NotFound    404    NOT_FOUND                 │
//! │  InsufficientStock                     409    INSUFFICIENT_STOCK        │
//! │  DbError::Timeout, PoolExhausted       503    UNAVAILABLE               │
//! │  any other DbError                     500    DATABASE_ERROR            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Infrastructure details are logged, never sent to the client.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kasir_core::ValidationError;
use kasir_db::{CheckoutError, DbError};
use serde::Serialize;

/// Error body: `{"code": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Insufficient stock (409)
    InsufficientStock,

    /// Store busy or deadline exceeded (503)
    Unavailable,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        if err.is_transient() {
            tracing::warn!(error = %err, "Database unavailable");
            let message = match err {
                DbError::Timeout(_) => "Operation timed out, try again",
                _ => "Database is busy, try again",
            };
            return ApiError::new(ErrorCode::Unavailable, message);
        }

        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::warn!("Check constraint violation: {}", message);
                ApiError::validation("Value out of range")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(e) => e.into(),
            CheckoutError::ProductNotFound { product_id } => {
                ApiError::not_found("Product", product_id)
            }
            err @ CheckoutError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CheckoutError::Infrastructure(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(ValidationError::malformed(rejection.body_text()).to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(ValidationError::malformed(rejection.body_text()).to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(ValidationError::malformed(rejection.body_text()).to_string())
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_checkout_error_mapping() {
        let err: ApiError = CheckoutError::ProductNotFound { product_id: 4 }.into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);

        let err: ApiError = CheckoutError::InsufficientStock {
            product_id: 1,
            name: "Kopi".to_string(),
            available: 2,
            requested: 3,
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
        assert!(err.message.contains("available 2"));

        let err: ApiError = CheckoutError::Validation(ValidationError::EmptyCart).into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError =
            CheckoutError::Infrastructure(DbError::Timeout(Duration::from_secs(10))).into();
        assert_eq!(err.code.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_transient_db_errors_are_unavailable() {
        let err: ApiError = DbError::PoolExhausted.into();
        assert_eq!(err.code, ErrorCode::Unavailable);
        assert_eq!(err.code.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = DbError::Timeout(Duration::from_millis(300)).into();
        assert_eq!(err.code, ErrorCode::Unavailable);
        assert!(err.message.contains("timed out"));

        let err: ApiError = DbError::not_found("Category", 2).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: ApiError = DbError::QueryFailed("no such table: products".to_string()).into();
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("products"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Product", 9)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "NOT_FOUND", "message": "Product not found: 9"})
        );
    }
}
