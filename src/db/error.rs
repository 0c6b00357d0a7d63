use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors surfaced by the store. Unique-constraint violations are lifted into
/// [`StoreError::Conflict`] so callers never inspect backend error codes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Conflict(detail),
            _ => Self::Database(err),
        }
    }
}

impl StoreError {
    pub const fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    /// Replaces the backend detail of a conflict with a caller-facing message.
    #[must_use]
    pub fn conflict_message(self, message: &str) -> Self {
        match self {
            Self::Conflict(_) => Self::Conflict(message.to_string()),
            other => other,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
