//! Per-username mutual exclusion.
//!
//! Authentication is a read-decide-write sequence on one credential record.
//! Holding a [`UsernameGuard`] across that sequence serialises attempts on the
//! same account while attempts on different accounts proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry = HashMap<String, Arc<AsyncMutex<()>>>;

/// Registry of async mutexes keyed by username.
///
/// Entries exist only while some task holds or waits for the lock.
#[derive(Debug, Default)]
pub struct UsernameLocks {
    registry: Mutex<Registry>,
}

/// Held lock for one username. Releasing it drops the registry entry when no
/// other task is waiting.
#[derive(Debug)]
pub struct UsernameGuard<'a> {
    // Field order: the mutex is released before the claim is dropped.
    _guard: OwnedMutexGuard<()>,
    _claim: Claim<'a>,
}

/// A task's interest in a registry entry, from the first wait until release.
///
/// Dropping it removes the entry once no other task references the mutex, so
/// a waiter cancelled before it acquires the lock cleans up too.
#[derive(Debug)]
struct Claim<'a> {
    locks: &'a UsernameLocks,
    username: String,
}

impl UsernameLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the lock for `username` is free and takes it.
    pub async fn lock(&self, username: &str) -> UsernameGuard<'_> {
        let claim = Claim {
            locks: self,
            username: username.to_owned(),
        };
        let mutex = Arc::clone(self.registry().entry(username.to_owned()).or_default());

        let guard = mutex.lock_owned().await;

        UsernameGuard {
            _guard: guard,
            _claim: claim,
        }
    }

    /// Number of usernames currently locked or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry().is_empty()
    }

    /// Locks the registry and recovers from poisoning.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.registry.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    /// Drops the entry for `username` if only the registry still references it.
    fn release(&self, username: &str) {
        let mut registry = self.registry();
        if registry
            .get(username)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            registry.remove(username);
        }
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.locks.release(&self.username);
    }
}
