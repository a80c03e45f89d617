//! Deterministic collaborators for tests of code built on the authenticator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use paygate_core::config::HasherConfig;
use paygate_store::model::{PasswordDigest, Salt};

use super::lockout::Clock;
use super::password::{Argon2Hasher, CredentialHasher};
use crate::error::AuthResult;

/// ## Summary
/// Argon2id at the minimum cost the algorithm accepts.
///
/// ## Errors
/// Returns `ConfigurationError` if the parameters are rejected.
pub fn fast_hasher() -> AuthResult<Argon2Hasher> {
    Argon2Hasher::new(&HasherConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
        pepper: None,
    })
}

/// Locks a mutex and recovers from poisoning.
fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            mutex.clear_poison();
            poisoned.into_inner()
        }
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        *lock_recover(&self.now) += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock_recover(&self.now)
    }
}

/// [`fast_hasher`] that counts key derivations.
#[derive(Debug)]
pub struct CountingHasher {
    inner: Argon2Hasher,
    derivations: AtomicUsize,
}

impl CountingHasher {
    /// ## Errors
    /// See [`fast_hasher`].
    pub fn new() -> AuthResult<Self> {
        Ok(Self {
            inner: fast_hasher()?,
            derivations: AtomicUsize::new(0),
        })
    }

    /// Key derivations so far, decoys included.
    #[must_use]
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::SeqCst)
    }
}

impl CredentialHasher for CountingHasher {
    fn generate_salt(&self) -> AuthResult<Salt> {
        self.inner.generate_salt()
    }

    fn hash_password(&self, password: &str, salt: &Salt) -> AuthResult<PasswordDigest> {
        self.derivations.fetch_add(1, Ordering::SeqCst);
        self.inner.hash_password(password, salt)
    }
}
