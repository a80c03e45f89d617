//! Authentication integration tests.
//!
//! Verifies that every rejected login looks the same to the caller and that a
//! successful login yields the principal recorded in the store.

use paygate_test::model::Role;

use super::helpers::*;

/// ## Summary
/// Test that the correct password yields a principal with the stored role.
#[test_log::test(tokio::test)]
async fn correct_password_returns_principal() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::HrOfficer).await;

    let principal = env
        .auth
        .authenticate("alice", PASSWORD)
        .await
        .expect("login succeeds");

    assert_eq!(principal.username(), "alice");
    assert_eq!(principal.role(), Role::HrOfficer);
    assert!(principal.is_active());
}

/// ## Summary
/// Test that usernames are matched after trimming and case folding.
#[test_log::test(tokio::test)]
async fn username_is_normalised() {
    let env = TestEnv::new().await;
    env.seed("Alice.Smith", Role::Employee).await;

    let principal = env
        .auth
        .authenticate("  ALICE.smith ", PASSWORD)
        .await
        .expect("login succeeds");
    assert_eq!(principal.username(), "alice.smith");
}

/// ## Summary
/// Test that unknown users, wrong passwords and inactive accounts produce the
/// same error.
#[test_log::test(tokio::test)]
async fn rejections_are_indistinguishable() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    env.seed("bob", Role::Employee).await;
    env.auth.set_active("bob", false).await.expect("deactivate");

    let unknown = env.auth.authenticate("mallory", PASSWORD).await;
    let wrong = env.auth.authenticate("alice", "not the password").await;
    let inactive = env.auth.authenticate("bob", PASSWORD).await;

    assert_eq!(unknown, Err(AuthError::InvalidCredentials));
    assert_eq!(wrong, Err(AuthError::InvalidCredentials));
    assert_eq!(inactive, Err(AuthError::InvalidCredentials));
}

/// ## Summary
/// Test that an inactive account is refused even with the correct password and
/// that the refusal does not count toward the lockout.
#[test_log::test(tokio::test)]
async fn inactive_account_with_correct_password_is_rejected() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Admin).await;
    env.auth.set_active("alice", false).await.expect("deactivate");

    for _ in 0..MAX_ATTEMPTS + 1 {
        assert_eq!(
            env.auth.authenticate("alice", PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        );
    }
    assert_eq!(env.failed_attempts("alice").await, 0);
}

/// ## Summary
/// Test that a missing account costs one key derivation like a real one.
#[test_log::test(tokio::test)]
async fn unknown_user_still_runs_the_hasher() {
    let env = TestEnv::new().await;
    let before = env.hasher.derivations();

    env.auth
        .authenticate("nobody", PASSWORD)
        .await
        .expect_err("unknown user");

    assert_eq!(env.hasher.derivations(), before + 1);
}

/// ## Summary
/// Test that a store outage surfaces as a transient error, never as success.
#[test_log::test(tokio::test)]
async fn store_outage_is_reported_as_unavailable() {
    let env = TestEnv::new().await;
    env.seed("alice", Role::Employee).await;
    env.store.set_available(false);

    let err = env
        .auth
        .authenticate("alice", PASSWORD)
        .await
        .expect_err("store is down");
    assert!(matches!(err, AuthError::StoreUnavailable(_)));
    assert!(err.is_transient());

    env.store.set_available(true);
    env.auth
        .authenticate("alice", PASSWORD)
        .await
        .expect("store is back");
}
