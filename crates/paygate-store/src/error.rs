use thiserror::Error;

/// Credential store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached. Safe to retry.
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Credential record not found: {0}")]
    NotFound(String),

    #[error("Credential record already exists: {0}")]
    AlreadyExists(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
