use chrono::{DateTime, Utc};
use thiserror::Error;

use paygate_store::error::StoreError;

/// Errors reported by authentication and account administration.
///
/// `InvalidCredentials` deliberately covers unknown usernames, wrong passwords
/// and inactive accounts so callers cannot tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account locked until {retry_after}")]
    AccountLocked { retry_after: DateTime<Utc> },

    /// Transient; the caller may retry.
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    /// Fatal at startup.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Entropy or key-derivation failure. Never downgraded to a weaker path.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Password rejected: {0}")]
    WeakPassword(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),
}

impl AuthError {
    /// Returns `true` for failures the caller may retry unchanged.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
            StoreError::NotFound(username) => Self::UnknownAccount(username),
            StoreError::AlreadyExists(username) => Self::UsernameTaken(username),
        }
    }
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Casbin error: {0}")]
    CasbinError(#[from] casbin::Error),

    #[error(transparent)]
    AuthError(#[from] AuthError),

    #[error(transparent)]
    StoreError(#[from] StoreError),

    #[error(transparent)]
    CoreError(#[from] paygate_core::error::CoreError),

    #[error("Authorization error: {0}")]
    AuthorizationError(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
