use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paygate_core::types::Role;

/// Random per-record salt bytes.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Salt(Vec<u8>);

impl Salt {
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt([REDACTED; {}])", self.0.len())
    }
}

/// Output of the password key-derivation function. Opaque to the store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(Vec<u8>);

impl PasswordDigest {
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PasswordDigest([REDACTED; {}])", self.0.len())
    }
}

/// Stored credentials and lockout counters for one account.
///
/// The record is keyed by its normalised `username`. The authentication core
/// only reads it and writes back the whole record under a per-username lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    pub role: Role,
    pub password_hash: PasswordDigest,
    pub salt: Salt,
    /// Consecutive failed logins since the last success or reset.
    pub failed_attempts: u32,
    /// Lock expiry. The account is locked while `now < locked_until`.
    pub locked_until: Option<DateTime<Utc>>,
    pub last_password_change: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Builds an active record with clean lockout counters.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        role: Role,
        password_hash: PasswordDigest,
        salt: Salt,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            role,
            password_hash,
            salt,
            failed_attempts: 0,
            locked_until: None,
            last_password_change: now,
            active: true,
            created_at: now,
        }
    }
}
