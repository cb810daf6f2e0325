use domain::{DomainError, RepositoryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("store error: {0}")]
    Store(RepositoryError),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("authorization failed")]
    Authorization,
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl ApplicationError {
    pub fn authentication(reason: impl Into<String>) -> Self {
        ApplicationError::Authentication(reason.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ApplicationError::NotFound("record"),
            other => ApplicationError::Store(other),
        }
    }
}
