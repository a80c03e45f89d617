//! Lockout integration tests.
//!
//! ## Lockout Model
//! - Each wrong password increments `failed_attempts`
//! - Reaching `MAX_ATTEMPTS` sets `locked_until = now + lockout_duration()`
//! - While locked, attempts are refused before any hashing
//! - Expiry is evaluated lazily at the next attempt

use chrono::TimeDelta;

use paygate_test::auth::Clock;
use paygate_test::model::Role;

use super::helpers::*;

/// ## Summary
/// Test that the attempt after the threshold is refused with the correct
/// password and that the hasher is not invoked.
#[test_log::test(tokio::test)]
async fn sixth_attempt_is_locked_without_hashing() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    let locked_at = env.clock.now();

    env.fail_logins("alice", MAX_ATTEMPTS).await;
    let derivations = env.hasher.derivations();

    let err = env
        .auth
        .authenticate("alice", PASSWORD)
        .await
        .expect_err("account is locked");

    assert_eq!(
        err,
        AuthError::AccountLocked {
            retry_after: locked_at + lockout_duration(),
        }
    );
    assert_eq!(env.hasher.derivations(), derivations);
    assert_eq!(env.failed_attempts("alice").await, MAX_ATTEMPTS);
}

/// ## Summary
/// Test that the attempts below the threshold keep the account usable.
#[test_log::test(tokio::test)]
async fn below_threshold_keeps_account_active() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;

    env.fail_logins("alice", MAX_ATTEMPTS - 1).await;
    assert_eq!(env.failed_attempts("alice").await, MAX_ATTEMPTS - 1);

    env.auth
        .authenticate("alice", PASSWORD)
        .await
        .expect("still below threshold");
    assert_eq!(env.failed_attempts("alice").await, 0);
}

/// ## Summary
/// Test that the lock lifts once the duration has elapsed and a successful
/// login then clears the counters.
#[test_log::test(tokio::test)]
async fn lock_lifts_lazily_after_duration() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    env.fail_logins("alice", MAX_ATTEMPTS).await;

    env.clock.advance(lockout_duration() - TimeDelta::seconds(1));
    assert!(matches!(
        env.auth.authenticate("alice", PASSWORD).await,
        Err(AuthError::AccountLocked { .. })
    ));

    env.clock.advance(TimeDelta::seconds(1));
    env.auth
        .authenticate("alice", PASSWORD)
        .await
        .expect("lock expired");

    let status = env.auth.lockout_status("alice").await.expect("status");
    assert!(!status.is_locked());
    assert_eq!(status.failed_attempts(), 0);
}

/// ## Summary
/// Test that a wrong password right after expiry locks the account again.
#[test_log::test(tokio::test)]
async fn failure_after_expiry_relocks() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    env.fail_logins("alice", MAX_ATTEMPTS).await;

    env.clock.advance(lockout_duration());
    env.fail_logins("alice", 1).await;

    assert!(matches!(
        env.auth.authenticate("alice", PASSWORD).await,
        Err(AuthError::AccountLocked { .. })
    ));
    assert_eq!(env.failed_attempts("alice").await, MAX_ATTEMPTS + 1);
}

/// ## Summary
/// Test that locking one account leaves the others untouched.
#[test_log::test(tokio::test)]
async fn lock_is_per_account() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    env.seed("bob", Role::Employee).await;

    env.fail_logins("alice", MAX_ATTEMPTS).await;

    env.auth
        .authenticate("bob", PASSWORD)
        .await
        .expect("bob is unaffected");
}

/// ## Summary
/// Test that an administrator can lift a lock early.
#[test_log::test(tokio::test)]
async fn admin_unlock_lifts_lock() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    env.fail_logins("alice", MAX_ATTEMPTS).await;
    assert!(
        env.auth
            .lockout_status("alice")
            .await
            .expect("status")
            .is_locked()
    );

    assert_eq!(env.auth.unlock("alice").await, Ok(true));
    env.auth
        .authenticate("alice", PASSWORD)
        .await
        .expect("unlocked");
}
