//! Database error types

use thiserror::Error;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<agentmarket_types::TypesError> for DbError {
    fn from(e: agentmarket_types::TypesError) -> Self {
        DbError::InvalidInput(e.to_string())
    }
}

impl DbError {
    /// Map SQLite constraint failures to `Constraint`, everything else to `Query`
    pub(crate) fn from_write(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
                return DbError::Constraint(db_err.message().to_string());
            }
        }
        DbError::Query(e)
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
