use std::future::Future;
use std::pin::Pin;

use crate::error::StoreResult;
use crate::model::CredentialRecord;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// The credential persistence contract consumed by the authentication core.
///
/// Implementations may be slow (network, disk) but are not cancelled by the
/// caller. Same-username serialisation is provided by the caller; a store only
/// has to apply each `save` as a single keyed replacement.
pub trait CredentialStore: Send + Sync {
    /// Loads the record for an already-normalised username.
    fn load<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<CredentialRecord>>;

    /// Replaces the record with the same username.
    ///
    /// Fails with `NotFound` if no such record exists.
    fn save<'a>(&'a self, record: &'a CredentialRecord) -> StoreFuture<'a, ()>;

    /// Inserts a new record.
    ///
    /// Fails with `AlreadyExists` if the username is taken.
    fn create<'a>(&'a self, record: &'a CredentialRecord) -> StoreFuture<'a, ()>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    fn load<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<CredentialRecord>> {
        (**self).load(username)
    }

    fn save<'a>(&'a self, record: &'a CredentialRecord) -> StoreFuture<'a, ()> {
        (**self).save(record)
    }

    fn create<'a>(&'a self, record: &'a CredentialRecord) -> StoreFuture<'a, ()> {
        (**self).create(record)
    }
}
