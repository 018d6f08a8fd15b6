//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError (validation / consistency)   sqlx::Error                    │
//! │       │                                      │                          │
//! │       └──────────────┬───────────────────────┘                          │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  category() ─► Validation | Consistency | Infrastructure               │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  Transport layer maps category to a response                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Retry Policy
//! Only `Infrastructure` errors are retryable. Order placement is atomic,
//! so retrying the whole call after backoff is safe.

use inventra_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Business rule violation detected by core or by a conditional update.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The order number counter could not be incremented.
    #[error("Order number sequencer unavailable: {0}")]
    SequencerUnavailable(String),

    /// The enclosing transaction could not be started, run or committed.
    ///
    /// Nothing was persisted; safe to retry the whole operation.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The caller's deadline passed before commit; rolled back.
    #[error("Deadline exceeded before commit")]
    DeadlineExceeded,

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate product code
    /// - Duplicate order number (counter reset by hand)
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
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

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// How the caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller mistake. Report, never retry automatically.
    Validation,
    /// Reflects current state. Re-fetch before trying again.
    Consistency,
    /// Transient. Retry the whole operation after backoff.
    Infrastructure,
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Categorizes the error per the retry policy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            DbError::Core(err) if err.is_validation() => ErrorCategory::Validation,
            DbError::Core(_) => ErrorCategory::Consistency,
            DbError::DeadlineExceeded => ErrorCategory::Infrastructure,
            DbError::NotFound { .. }
            | DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. } => ErrorCategory::Consistency,
            DbError::SequencerUnavailable(_)
            | DbError::TransactionFailed(_)
            | DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ErrorCategory::Infrastructure,
        }
    }

    /// True when retrying the whole operation after backoff is safe.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Infrastructure
    }

    /// Collapses infrastructure failures into `TransactionFailed`.
    ///
    /// Used inside a unit of work so callers see one generic persistence
    /// failure; domain errors pass through unchanged.
    pub(crate) fn in_transaction(self) -> Self {
        match self {
            DbError::QueryFailed(msg)
            | DbError::ConnectionFailed(msg)
            | DbError::Internal(msg) => DbError::TransactionFailed(msg),
            DbError::PoolExhausted => DbError::TransactionFailed("connection pool exhausted".to_string()),
            other => other,
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

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
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

impl From<inventra_core::ValidationError> for DbError {
    fn from(err: inventra_core::ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            DbError::from(CoreError::EmptyOrder).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            DbError::from(CoreError::InvalidStatus("x".into())).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            DbError::from(CoreError::InsufficientStock {
                product_id: 1,
                product_code: "A".into(),
                available: 0,
                requested: 1,
            })
            .category(),
            ErrorCategory::Consistency
        );
        assert_eq!(
            DbError::from(CoreError::ProductNotFound(1)).category(),
            ErrorCategory::Consistency
        );
        assert!(DbError::SequencerUnavailable("down".into()).is_retryable());
        assert!(DbError::TransactionFailed("busy".into()).is_retryable());
        assert!(!DbError::from(CoreError::EmptyOrder).is_retryable());
    }

    #[test]
    fn test_in_transaction_collapses_infrastructure() {
        assert!(matches!(
            DbError::QueryFailed("locked".into()).in_transaction(),
            DbError::TransactionFailed(_)
        ));
        assert!(matches!(
            DbError::PoolExhausted.in_transaction(),
            DbError::TransactionFailed(_)
        ));
        assert!(matches!(
            DbError::from(CoreError::ProductNotFound(3)).in_transaction(),
            DbError::Core(CoreError::ProductNotFound(3))
        ));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
