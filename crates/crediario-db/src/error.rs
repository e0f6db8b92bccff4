//! Error types for the persistence layer.
//!
//! All storage failures are propagated via [`DbError`], which wraps the
//! underlying [`sqlx`] errors and carries validation and tracking
//! failures that are detected before any statement reaches storage.

use crate::tracking::TrackError;

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A SQL statement or connection operation failed.
    #[error("storage error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An entity violated a declared constraint before any write was issued.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A change-tracking operation was misused.
    #[error("tracking error: {0}")]
    Tracking(#[from] TrackError),

    /// A configuration value could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Whether this failure is transient and safe to retry for
    /// read-only operations (connection-level faults, pool exhaustion).
    ///
    /// Constraint violations and validation failures are never
    /// transient: retrying would re-issue the same rejected statement.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Sql(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            _ => false,
        }
    }

    /// Whether storage rejected a write due to a foreign-key or
    /// uniqueness violation.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Sql(sqlx::Error::Database(e)) => {
                e.is_foreign_key_violation() || e.is_unique_violation()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_transient() {
        let err = DbError::Sql(sqlx::Error::PoolTimedOut);
        assert!(err.is_transient());
    }

    #[test]
    fn validation_failure_is_not_transient() {
        let err = DbError::Validation(validator::ValidationErrors::new());
        assert!(!err.is_transient());
        assert!(!err.is_constraint_violation());
    }

    #[test]
    fn row_not_found_is_not_transient() {
        let err = DbError::Sql(sqlx::Error::RowNotFound);
        assert!(!err.is_transient());
    }
}
