//! In-process credential store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::model::CredentialRecord;
use crate::store::{CredentialStore, StoreFuture};

/// A `HashMap`-backed [`CredentialStore`].
///
/// Besides serving single-node embeddings it doubles as a test double: it can
/// be switched to an unavailable state and counts writes.
#[derive(Debug)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<String, CredentialRecord>>,
    available: AtomicBool,
    saves: AtomicUsize,
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            saves: AtomicUsize::new(0),
        }
    }

    /// Simulates an outage: while unavailable every call fails with
    /// `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "in-memory store switched off".to_string(),
            ))
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<CredentialRecord>> {
        Box::pin(async move {
            self.ensure_available()?;
            Ok(self.records.read().await.get(username).cloned())
        })
    }

    fn save<'a>(&'a self, record: &'a CredentialRecord) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.ensure_available()?;
            let mut records = self.records.write().await;
            let slot = records
                .get_mut(&record.username)
                .ok_or_else(|| StoreError::NotFound(record.username.clone()))?;
            *slot = record.clone();
            self.saves.fetch_add(1, Ordering::SeqCst);
            tracing::trace!(username = %record.username, "Credential record saved");
            Ok(())
        })
    }

    fn create<'a>(&'a self, record: &'a CredentialRecord) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.ensure_available()?;
            let mut records = self.records.write().await;
            if records.contains_key(&record.username) {
                return Err(StoreError::AlreadyExists(record.username.clone()));
            }
            records.insert(record.username.clone(), record.clone());
            tracing::debug!(username = %record.username, "Credential record created");
            Ok(())
        })
    }
}
