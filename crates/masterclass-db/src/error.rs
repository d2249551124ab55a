//! # Database Error Types
//!
//! Error types for database operations.
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
//! │       ├──► repository callers (seed, CLI admin commands)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CoreError (at a port boundary) ← What the CartEngine sees             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use masterclass_core::{CoreError, ValidationError};
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
    /// - `fetch_one` returns no rows
    /// - Replacing or deleting an id that doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate SKU
    /// - Registering an email twice
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A cart was written with a version that is no longer current.
    #[error("Cart {cart_id} version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        cart_id: String,
        expected: i64,
        actual: i64,
    },

    /// A stored row could not be turned back into a domain value.
    ///
    /// ## When This Occurs
    /// - A price or total column holds text that is not a decimal
    /// - A stored total has more than two fraction digits
    #[error("Invalid data in {table}.{column}: {reason}")]
    InvalidData {
        table: String,
        column: String,
        reason: String,
    },

    /// A value was rejected before it reached SQL.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Password hashing or verification failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidData error for a column.
    pub fn invalid_data(
        table: impl Into<String>,
        column: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        DbError::InvalidData {
            table: table.into(),
            column: column.into(),
            reason: reason.to_string(),
        }
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
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
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

/// Maps database failures onto what the cart engine understands.
///
/// ```text
/// DbError::NotFound         → CoreError::NotFound
/// DbError::VersionConflict  → CoreError::Conflict
/// DbError::Validation       → CoreError::Validation
/// Other                     → CoreError::Persistence
/// ```
impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            DbError::VersionConflict {
                cart_id, expected, ..
            } => CoreError::Conflict {
                cart_id,
                expected_version: expected,
            },
            DbError::Validation(e) => CoreError::Validation(e),
            other => CoreError::Persistence(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let core: CoreError = DbError::not_found("Cart", "c1").into();
        assert!(core.is_not_found());

        let core: CoreError = DbError::VersionConflict {
            cart_id: "c1".to_string(),
            expected: 3,
            actual: 4,
        }
        .into();
        assert!(matches!(
            core,
            CoreError::Conflict {
                expected_version: 3,
                ..
            }
        ));

        let core: CoreError = DbError::invalid_data("carts", "total", "bad").into();
        assert!(matches!(core, CoreError::Persistence(_)));
    }
}
