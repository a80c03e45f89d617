//! Concurrency integration tests.
//!
//! Concurrent attempts on one account must be applied one at a time: no two
//! failures may read the same counter, and the lock is set exactly once.

use std::sync::Arc;

use futures::future::join_all;

use paygate_test::auth::Clock;
use paygate_test::model::Role;

use super::helpers::*;

const CONCURRENT_ATTEMPTS: usize = 20;

/// ## Summary
/// Test that a burst of wrong passwords is counted exactly up to the threshold.
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_failures_count_exactly_max_attempts() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    let derivations = env.hasher.derivations();
    let now = env.clock.now();

    let tasks = (0..CONCURRENT_ATTEMPTS).map(|_| {
        let auth = Arc::clone(&env.auth);
        tokio::spawn(async move { auth.authenticate("alice", "wrong guess").await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    let invalid = results
        .iter()
        .filter(|r| matches!(r, Err(AuthError::InvalidCredentials)))
        .count();
    let locked = results
        .iter()
        .filter(|r| matches!(r, Err(AuthError::AccountLocked { .. })))
        .count();

    assert_eq!(invalid, MAX_ATTEMPTS as usize);
    assert_eq!(locked, CONCURRENT_ATTEMPTS - MAX_ATTEMPTS as usize);
    assert_eq!(env.failed_attempts("alice").await, MAX_ATTEMPTS);
    assert_eq!(env.hasher.derivations() - derivations, MAX_ATTEMPTS as usize);
    assert_eq!(env.store.save_count(), MAX_ATTEMPTS as usize);

    let record = env
        .store
        .load("alice")
        .await
        .expect("store available")
        .expect("record exists");
    assert_eq!(record.locked_until, Some(now + lockout_duration()));
}

/// ## Summary
/// Test that concurrent correct logins on one account all succeed.
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_successes_all_pass() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;

    let tasks = (0..CONCURRENT_ATTEMPTS).map(|_| {
        let auth = Arc::clone(&env.auth);
        tokio::spawn(async move { auth.authenticate("alice", PASSWORD).await })
    });

    for joined in join_all(tasks).await {
        let principal = joined.expect("task completes").expect("login succeeds");
        assert_eq!(principal.username(), "alice");
    }
    assert_eq!(env.failed_attempts("alice").await, 0);
}

/// ## Summary
/// Test that attacking one account does not affect logins on another.
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn different_accounts_are_independent() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    env.seed("bob", Role::PayrollOfficer).await;

    let attacks = (0..CONCURRENT_ATTEMPTS).map(|_| {
        let auth = Arc::clone(&env.auth);
        tokio::spawn(async move { auth.authenticate("alice", "wrong guess").await })
    });
    let logins = (0..4).map(|_| {
        let auth = Arc::clone(&env.auth);
        tokio::spawn(async move { auth.authenticate("bob", PASSWORD).await })
    });

    let (attacks, logins) = futures::join!(join_all(attacks), join_all(logins));

    assert!(
        attacks
            .into_iter()
            .all(|joined| joined.expect("task completes").is_err())
    );
    for joined in logins {
        joined.expect("task completes").expect("bob logs in");
    }
    assert_eq!(env.failed_attempts("bob").await, 0);
}
