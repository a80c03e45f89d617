//! Account administration: registration, password changes, unlocks.
//!
//! These operations share the [`Authenticator`]'s store, hasher and username
//! locks, so an administrative write can never interleave with a login on the
//! same account. Every credential is derived through the hasher.

use chrono::{DateTime, Utc};

use paygate_core::constants::PASSWORD_MAX_BYTES;
use paygate_core::types::{Principal, Role};
use paygate_core::util::username::normalize_username;
use paygate_store::model::{CredentialRecord, PasswordDigest, Salt};

use crate::error::{AuthError, AuthResult};

use super::authenticate::{Authenticator, principal_of};
use super::lockout::LockState;

/// Read-only view of an account's lockout counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    Active {
        failed_attempts: u32,
    },
    Locked {
        retry_after: DateTime<Utc>,
        failed_attempts: u32,
    },
}

impl LockoutStatus {
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    #[must_use]
    pub const fn failed_attempts(&self) -> u32 {
        match self {
            Self::Active { failed_attempts } | Self::Locked { failed_attempts, .. } => {
                *failed_attempts
            }
        }
    }
}

impl Authenticator {
    /// ## Summary
    /// Creates an active account with a freshly salted credential.
    ///
    /// ## Errors
    /// - `InvalidUsername` or `WeakPassword` if the input breaks the rules
    /// - `UsernameTaken` if the account already exists
    /// - `StoreUnavailable` or `Hashing` on infrastructure failure
    #[tracing::instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> AuthResult<Principal> {
        let username = admin_username(username)?;
        self.check_password_policy(password)?;

        let _guard = self.locks.lock(&username).await;
        let (salt, digest) = self.derive_credential(password).await?;
        let record = CredentialRecord::new(username, role, digest, salt, self.clock.now());
        self.store.create(&record).await?;

        tracing::info!(username = %record.username, %role, "Account registered");
        Ok(principal_of(&record))
    }

    /// ## Summary
    /// Replaces the password after verifying the current one.
    ///
    /// The check against `current` is a full login attempt: a wrong password
    /// counts toward the lockout and a locked account is refused.
    ///
    /// ## Errors
    /// - `WeakPassword` if `new` breaks the password rules (checked first)
    /// - any error of [`Authenticator::authenticate`]
    #[tracing::instrument(skip(self, current, new))]
    pub async fn change_password(
        &self,
        username: &str,
        current: &str,
        new: &str,
    ) -> AuthResult<()> {
        self.check_password_policy(new)?;
        let Ok(username) = normalize_username(username) else {
            self.decoy_verify(current).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let _guard = self.locks.lock(&username).await;
        let mut record = self.verify_attempt(&username, current).await?;
        self.replace_credential(&mut record, new).await?;
        self.store.save(&record).await?;

        tracing::info!(username = %record.username, "Password changed");
        Ok(())
    }

    /// ## Summary
    /// Administrative password reset. Clears the lockout counters.
    ///
    /// ## Errors
    /// - `InvalidUsername`, `WeakPassword` or `UnknownAccount`
    /// - `StoreUnavailable` or `Hashing` on infrastructure failure
    #[tracing::instrument(skip(self, new))]
    pub async fn reset_password(&self, username: &str, new: &str) -> AuthResult<()> {
        let username = admin_username(username)?;
        self.check_password_policy(new)?;

        let _guard = self.locks.lock(&username).await;
        let mut record = self.load_existing(&username).await?;
        self.replace_credential(&mut record, new).await?;
        self.store.save(&record).await?;

        tracing::info!(username = %record.username, "Password reset");
        Ok(())
    }

    /// ## Summary
    /// Clears `failed_attempts` and any lock.
    ///
    /// Returns `true` if anything had to be cleared.
    ///
    /// ## Errors
    /// `InvalidUsername`, `UnknownAccount` or `StoreUnavailable`.
    #[tracing::instrument(skip(self))]
    pub async fn unlock(&self, username: &str) -> AuthResult<bool> {
        let username = admin_username(username)?;

        let _guard = self.locks.lock(&username).await;
        let mut record = self.load_existing(&username).await?;
        let changed = self.policy.reset(&mut record);
        if changed {
            self.store.save(&record).await?;
            tracing::warn!(username = %record.username, "Account unlocked by administrator");
        }
        Ok(changed)
    }

    /// ## Summary
    /// Enables or disables an account. Disabled accounts cannot log in.
    ///
    /// ## Errors
    /// `InvalidUsername`, `UnknownAccount` or `StoreUnavailable`.
    #[tracing::instrument(skip(self))]
    pub async fn set_active(&self, username: &str, active: bool) -> AuthResult<()> {
        let username = admin_username(username)?;

        let _guard = self.locks.lock(&username).await;
        let mut record = self.load_existing(&username).await?;
        if record.active != active {
            record.active = active;
            self.store.save(&record).await?;
            tracing::info!(username = %record.username, active, "Account activation changed");
        }
        Ok(())
    }

    /// ## Summary
    /// Reports the lockout state of an account at the current time.
    ///
    /// ## Errors
    /// `InvalidUsername`, `UnknownAccount` or `StoreUnavailable`.
    pub async fn lockout_status(&self, username: &str) -> AuthResult<LockoutStatus> {
        let username = admin_username(username)?;
        let record = self.load_existing(&username).await?;

        Ok(match self.policy.state(&record, self.clock.now()) {
            LockState::Active => LockoutStatus::Active {
                failed_attempts: record.failed_attempts,
            },
            LockState::Locked { retry_after } => LockoutStatus::Locked {
                retry_after,
                failed_attempts: record.failed_attempts,
            },
        })
    }

    /// ## Errors
    /// `WeakPassword` if `password` is shorter than the configured minimum
    /// (in characters) or longer than [`PASSWORD_MAX_BYTES`].
    pub fn check_password_policy(&self, password: &str) -> AuthResult<()> {
        if password.chars().count() < self.password_min_length {
            return Err(AuthError::WeakPassword(format!(
                "must be at least {} characters",
                self.password_min_length
            )));
        }
        if password.len() > PASSWORD_MAX_BYTES {
            return Err(AuthError::WeakPassword(format!(
                "must be at most {PASSWORD_MAX_BYTES} bytes"
            )));
        }
        Ok(())
    }

    async fn load_existing(&self, username: &str) -> AuthResult<CredentialRecord> {
        self.store
            .load(username)
            .await?
            .ok_or_else(|| AuthError::UnknownAccount(username.to_owned()))
    }

    async fn derive_credential(&self, password: &str) -> AuthResult<(Salt, PasswordDigest)> {
        let password = password.to_owned();
        self.run_hasher(move |hasher| {
            let salt = hasher.generate_salt()?;
            let digest = hasher.hash_password(&password, &salt)?;
            Ok((salt, digest))
        })
        .await
    }

    async fn replace_credential(
        &self,
        record: &mut CredentialRecord,
        password: &str,
    ) -> AuthResult<()> {
        let (salt, digest) = self.derive_credential(password).await?;
        record.salt = salt;
        record.password_hash = digest;
        record.last_password_change = self.clock.now();
        self.policy.reset(record);
        Ok(())
    }
}

fn admin_username(raw: &str) -> AuthResult<String> {
    normalize_username(raw).map_err(|e| AuthError::InvalidUsername(e.to_string()))
}
