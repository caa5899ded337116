use thiserror::Error;

use crate::repository::errors::RepositoryError;

/// Failures surfaced to route handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    /// Submitted form failed validation; nothing was sent to the host.
    #[error("form error: {0}")]
    Form(String),

    #[error("type constraint violation: {0}")]
    TypeConstraint(String),

    /// The host accepted the request but refused the change.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("remote error: {0}")]
    Remote(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ValidationError(message) => ServiceError::TypeConstraint(message),
            other => ServiceError::Remote(other.to_string()),
        }
    }
}
