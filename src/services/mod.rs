//! Domain services. Each service owns a handle to the SQLite pool and exposes
//! the operations the HTTP handlers need, returning [`ServiceError`] on failure.

pub mod fox_service;
pub mod user_service;
pub mod visit_service;
pub mod warren_service;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Too many bunnies. Maximum allowed is {limit}")]
    CapacityExceeded { limit: i64 },
    #[error("{0}")]
    Forbidden(String),
    #[error("rabbit hole location `{0}` already exists")]
    DuplicateLocation(String),
    #[error("username `{0}` already exists")]
    DuplicateUsername(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
