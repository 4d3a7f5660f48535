//! Error types shared by the PostgreSQL storage implementation.

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`PgDaoError`] failures.
pub type PgResult<T> = Result<T, PgDaoError>;

/// Failures that can occur while talking to PostgreSQL.
#[derive(Debug, Error)]
pub enum PgDaoError {
    /// The connection pool could not be established.
    #[error("failed to connect to PostgreSQL")]
    Connect {
        #[source]
        source: sqlx::Error,
    },
    /// Applying the embedded schema migrations failed.
    #[error("failed to apply PostgreSQL migrations")]
    Migrate {
        #[source]
        source: MigrateError,
    },
    /// A statement failed while performing `operation`.
    #[error("PostgreSQL query failed during {operation}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl PgDaoError {
    /// True when the database rejected the write because of a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        self.constraint_violation()
            .is_some_and(|db_err| db_err.is_unique_violation())
    }

    /// True when the database rejected the write because of a foreign key.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.constraint_violation()
            .is_some_and(|db_err| db_err.is_foreign_key_violation())
    }

    /// Name of the violated constraint, when the database reported one.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint_violation()
            .and_then(|db_err| db_err.constraint())
    }

    fn constraint_violation(&self) -> Option<&dyn sqlx::error::DatabaseError> {
        match self {
            PgDaoError::Query { source, .. } => source.as_database_error(),
            _ => None,
        }
    }
}

/// Build a closure tagging a [`sqlx::Error`] with the operation that produced it.
pub fn query_failed(operation: &'static str) -> impl FnOnce(sqlx::Error) -> PgDaoError {
    move |source| PgDaoError::Query { operation, source }
}

impl From<PgDaoError> for StorageError {
    fn from(err: PgDaoError) -> Self {
        if err.is_unique_violation() || err.is_foreign_key_violation() {
            return StorageError::conflict(err.to_string());
        }
        StorageError::unavailable(err.to_string(), err)
    }
}
