//! Username/password authentication with brute-force lockout.

use std::sync::Arc;

use paygate_core::config::Settings;
use paygate_core::types::Principal;
use paygate_core::util::username::normalize_username;
use paygate_store::model::{CredentialRecord, PasswordDigest, Salt};
use paygate_store::store::CredentialStore;

use crate::error::{AuthError, AuthResult};

use super::locks::UsernameLocks;
use super::lockout::{Clock, FailureOutcome, LockState, LockoutPolicy, SystemClock};
use super::password::{Argon2Hasher, CredentialHasher, DIGEST_LEN};

/// Verifies credentials against a [`CredentialStore`] and maintains the
/// lockout counters of each record.
///
/// Every read-decide-write on a record runs under that record's username lock,
/// so concurrent attempts on one account never read the same counter.
pub struct Authenticator {
    pub(super) store: Arc<dyn CredentialStore>,
    pub(super) hasher: Arc<dyn CredentialHasher>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) policy: LockoutPolicy,
    pub(super) locks: UsernameLocks,
    pub(super) password_min_length: usize,
    decoy_salt: Salt,
    decoy_digest: PasswordDigest,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("policy", &self.policy)
            .field("password_min_length", &self.password_min_length)
            .field("locked_usernames", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// ## Summary
    /// Creates an authenticator using the system clock.
    ///
    /// ## Errors
    /// Returns `Hashing` if the decoy salt used for unknown usernames cannot be
    /// drawn.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn CredentialHasher>,
        policy: LockoutPolicy,
    ) -> AuthResult<Self> {
        let decoy_salt = hasher.generate_salt()?;
        Ok(Self {
            store,
            hasher,
            clock: Arc::new(SystemClock),
            policy,
            locks: UsernameLocks::new(),
            password_min_length: paygate_core::constants::DEFAULT_PASSWORD_MIN_LENGTH,
            decoy_salt,
            decoy_digest: PasswordDigest::from_bytes(vec![0; DIGEST_LEN]),
        })
    }

    /// ## Summary
    /// Creates an authenticator from validated settings with the Argon2 hasher.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` for invalid `auth` or `hasher` settings.
    pub fn from_settings(store: Arc<dyn CredentialStore>, settings: &Settings) -> AuthResult<Self> {
        settings
            .validate()
            .map_err(|e| AuthError::ConfigurationError(e.to_string()))?;

        let hasher = Argon2Hasher::new(&settings.hasher)?;
        let policy = LockoutPolicy::from_config(&settings.auth)?;

        Ok(Self::new(store, Arc::new(hasher), policy)?
            .with_password_min_length(settings.auth.password_min_length))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn with_password_min_length(mut self, password_min_length: usize) -> Self {
        self.password_min_length = password_min_length;
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// ## Summary
    /// Verifies `password` for `username` and returns the authenticated
    /// principal.
    ///
    /// ## Side Effects
    /// A wrong password increments `failed_attempts` and may lock the account;
    /// a correct one clears both.
    ///
    /// ## Errors
    /// - `InvalidCredentials` for unknown usernames, inactive accounts and
    ///   wrong passwords alike
    /// - `AccountLocked` while the lock is in force; the hasher is not run
    /// - `StoreUnavailable` if the store fails
    /// - `Hashing` if key derivation cannot run
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Principal> {
        let Ok(username) = normalize_username(username) else {
            tracing::debug!("Rejected malformed username");
            self.decoy_verify(password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let _guard = self.locks.lock(&username).await;
        let record = self.verify_attempt(&username, password).await?;

        tracing::info!(username = %record.username, role = %record.role, "Login succeeded");
        Ok(principal_of(&record))
    }

    /// ## Summary
    /// One login attempt against a normalised username. The caller must hold
    /// the username lock.
    ///
    /// Returns the record as persisted after a successful attempt.
    pub(super) async fn verify_attempt(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<CredentialRecord> {
        let Some(mut record) = self.store.load(username).await? else {
            tracing::debug!("Unknown username");
            self.decoy_verify(password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !record.active {
            tracing::debug!("Login attempt on inactive account");
            self.decoy_verify(password).await?;
            return Err(AuthError::InvalidCredentials);
        }

        if record.salt.is_empty() {
            tracing::error!(username = %record.username, "Credential record has no salt");
            self.decoy_verify(password).await?;
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        if let LockState::Locked { retry_after } = self.policy.state(&record, now) {
            tracing::info!(%retry_after, "Login attempt on locked account");
            return Err(AuthError::AccountLocked { retry_after });
        }

        let matched = self
            .verify_password(password, &record.password_hash, &record.salt)
            .await?;

        if matched {
            if self.policy.record_success(&mut record) {
                self.store.save(&record).await?;
            }
            return Ok(record);
        }

        match self.policy.record_failure(&mut record, now)? {
            FailureOutcome::Counted {
                failed_attempts,
                remaining,
            } => {
                tracing::debug!(failed_attempts, remaining, "Wrong password");
            }
            FailureOutcome::Locked {
                failed_attempts,
                until,
            } => {
                tracing::warn!(
                    username = %record.username,
                    failed_attempts,
                    locked_until = %until,
                    "Account locked after repeated failures"
                );
            }
        }
        self.store.save(&record).await?;

        Err(AuthError::InvalidCredentials)
    }

    /// Runs a closure against the hasher on the blocking pool.
    pub(super) async fn run_hasher<T, F>(&self, job: F) -> AuthResult<T>
    where
        F: FnOnce(&dyn CredentialHasher) -> AuthResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || job(hasher.as_ref()))
            .await
            .map_err(|e| AuthError::Hashing(format!("Hashing task failed: {e}")))?
    }

    async fn verify_password(
        &self,
        password: &str,
        expected: &PasswordDigest,
        salt: &Salt,
    ) -> AuthResult<bool> {
        let password = password.to_owned();
        let expected = expected.clone();
        let salt = salt.clone();
        self.run_hasher(move |hasher| Ok(hasher.verify(&password, &expected, &salt)))
            .await
    }

    /// Spends one hash on a decoy so a miss costs as much as a wrong password.
    pub(super) async fn decoy_verify(&self, password: &str) -> AuthResult<()> {
        self.verify_password(password, &self.decoy_digest, &self.decoy_salt)
            .await
            .map(|_| ())
    }
}

/// Principal for a record that is active and was just verified or created.
pub(super) fn principal_of(record: &CredentialRecord) -> Principal {
    debug_assert!(record.active);
    Principal::issue(record.username.clone(), record.role)
}
