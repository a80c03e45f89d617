#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Building an `Authenticator` over an in-memory store with a manual clock
//! - Counting how often the password hasher runs
//! - Seeding accounts

use std::sync::Arc;

use chrono::{TimeDelta, Utc};

use paygate_test::auth::{
    Authenticator, Authorizer, DEFAULT_POLICY, LockoutPolicy, PermissionCatalog,
};
use paygate_test::model::{Principal, Role};
use paygate_test::paygate_store::memory::InMemoryCredentialStore;

pub use paygate_test::auth::test_support::{CountingHasher, ManualClock};

pub use paygate_test::auth::AuthError;
pub use paygate_test::paygate_store::store::CredentialStore;

pub const MAX_ATTEMPTS: u32 = 5;
pub const PASSWORD: &str = "correct horse battery";

pub fn lockout_duration() -> TimeDelta {
    TimeDelta::minutes(15)
}

/// Everything a test needs, wired together.
pub struct TestEnv {
    pub store: Arc<InMemoryCredentialStore>,
    pub hasher: Arc<CountingHasher>,
    pub clock: Arc<ManualClock>,
    pub auth: Arc<Authenticator>,
    pub authz: Authorizer,
}

impl TestEnv {
    /// ## Summary
    /// Default policy: five attempts, fifteen minutes, built-in catalog.
    pub async fn new() -> Self {
        Self::with_policy(MAX_ATTEMPTS, lockout_duration()).await
    }

    pub async fn with_policy(max_attempts: u32, lockout: TimeDelta) -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let hasher = Arc::new(CountingHasher::new().expect("test hasher"));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let policy = LockoutPolicy::new(max_attempts, lockout).expect("valid policy");

        let auth = Authenticator::new(store.clone(), hasher.clone(), policy)
            .expect("authenticator")
            .with_clock(clock.clone());
        let catalog = PermissionCatalog::from_policy(DEFAULT_POLICY)
            .await
            .expect("built-in catalog");

        Self {
            store,
            hasher,
            clock,
            auth: Arc::new(auth),
            authz: Authorizer::new(Arc::new(catalog)),
        }
    }

    /// Registers `username` with [`PASSWORD`].
    pub async fn seed(&self, username: &str, role: Role) -> Principal {
        self.auth
            .register(username, PASSWORD, role)
            .await
            .expect("seed account")
    }

    /// Submits `count` wrong passwords and asserts each is rejected.
    pub async fn fail_logins(&self, username: &str, count: u32) {
        for _ in 0..count {
            let err = self
                .auth
                .authenticate(username, "definitely wrong")
                .await
                .expect_err("wrong password must fail");
            assert!(
                matches!(
                    err,
                    AuthError::InvalidCredentials | AuthError::AccountLocked { .. }
                ),
                "unexpected error: {err:?}"
            );
        }
    }

    pub async fn failed_attempts(&self, username: &str) -> u32 {
        self.store
            .load(username)
            .await
            .expect("store available")
            .expect("record exists")
            .failed_attempts
    }
}
