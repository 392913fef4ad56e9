//! # Database Error Types
//!
//! Error types for database operations and the checkout unit of work.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──────────────► CheckoutError::Infrastructure                   │
//! │       │                      ▲                                          │
//! │       │      CoreError ──────┘ (Validation, ProductNotFound, ...)      │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← Serialized for HTTP clients                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use kasir_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - Soft-deleted record
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Product references a non-existent category_id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint rejected the row (negative stock or price).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Operation exceeded its deadline; its unit of work was rolled back.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True for failures a client may retry later (busy pool, deadline).
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::PoolExhausted | DbError::Timeout(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// Every way a checkout can fail.
///
/// The first three are client errors; nothing was persisted and resubmitting
/// the same cart yields the same answer until stock changes.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Malformed cart: empty, non-positive quantity, too many lines.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A line names a product that does not exist or was deleted.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    /// A line asks for more than is on hand.
    #[error("Insufficient stock for product {product_id} ({name}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Store unreachable, deadline exceeded or commit failed.
    #[error(transparent)]
    Infrastructure(#[from] DbError),
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound { product_id } => {
                CheckoutError::ProductNotFound { product_id }
            }
            CoreError::InsufficientStock {
                product_id,
                name,
                available,
                requested,
            } => CheckoutError::InsufficientStock {
                product_id,
                name,
                available,
                requested,
            },
            CoreError::Validation(err) => CheckoutError::Validation(err),
            // Checkout never references categories.
            CoreError::CategoryNotFound { category_id } => {
                CheckoutError::Infrastructure(DbError::not_found("Category", category_id))
            }
        }
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Infrastructure(err.into())
    }
}

/// Result type for checkout.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_maps_to_checkout_error() {
        let err: CheckoutError = CoreError::ProductNotFound { product_id: 3 }.into();
        assert!(matches!(err, CheckoutError::ProductNotFound { product_id: 3 }));

        let err: CheckoutError = CoreError::Validation(ValidationError::EmptyCart).into();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));
    }

    #[test]
    fn test_transient_errors() {
        assert!(DbError::PoolExhausted.is_transient());
        assert!(DbError::Timeout(Duration::from_secs(10)).is_transient());
        assert!(!DbError::not_found("Product", 1).is_transient());
    }
}
