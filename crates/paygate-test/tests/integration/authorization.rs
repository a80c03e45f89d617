//! Authorization integration tests.
//!
//! ## Roles and Permissions
//! - `ADMIN`: everything, including `user.manage`
//! - `HR_OFFICER`: employee view/manage, reports, profile
//! - `PAYROLL_OFFICER`: payroll view/manage, employee view, reports, profile
//! - `EMPLOYEE`: profile, payroll view
//! - `USER`: profile

use paygate_test::auth::{AuthzResult, ServiceError};
use paygate_test::model::{Role, permissions};

use super::helpers::*;

/// ## Summary
/// Test the role scenario end to end: log in, then check permissions with the
/// returned principal.
#[test_log::test(tokio::test)]
async fn rbac_scenario() {
    let env = TestEnv::new().await;
    env.seed("root", Role::Admin).await;
    env.seed("harriet", Role::HrOfficer).await;
    env.seed("erin", Role::Employee).await;

    let admin = env.auth.authenticate("root", PASSWORD).await.expect("admin");
    let hr = env.auth.authenticate("harriet", PASSWORD).await.expect("hr");
    let employee = env.auth.authenticate("erin", PASSWORD).await.expect("employee");

    assert!(env.authz.authorize(&admin, permissions::USER_MANAGE));
    assert!(!env.authz.authorize(&employee, permissions::PAYROLL_MANAGE));

    assert!(env.authz.has_admin_or_hr_role(&admin));
    assert!(env.authz.has_admin_or_hr_role(&hr));
    assert!(!env.authz.has_admin_or_hr_role(&employee));
}

/// ## Summary
/// Test that `require` turns a denial into an authorization error.
#[test_log::test(tokio::test)]
async fn require_denies_missing_permission() {
    let env = TestEnv::new().await;
    let employee = env.seed("erin", Role::Employee).await;

    assert_eq!(
        env.authz.check(&employee, permissions::PAYROLL_VIEW),
        AuthzResult::Allowed
    );
    let err = env
        .authz
        .require(&employee, permissions::EMPLOYEE_MANAGE)
        .expect_err("employees cannot manage employees");
    assert!(matches!(err, ServiceError::AuthorizationError(_)));
}

/// ## Summary
/// Test every role against every well-known permission.
#[test_log::test(tokio::test)]
async fn permission_matrix() {
    let env = TestEnv::new().await;
    let all = [
        permissions::EMPLOYEE_VIEW,
        permissions::EMPLOYEE_MANAGE,
        permissions::PAYROLL_VIEW,
        permissions::PAYROLL_MANAGE,
        permissions::USER_MANAGE,
        permissions::REPORT_VIEW,
        permissions::PROFILE_VIEW,
    ];
    let expected: [(Role, &[&str]); 5] = [
        (Role::Admin, &all),
        (
            Role::HrOfficer,
            &[
                permissions::EMPLOYEE_VIEW,
                permissions::EMPLOYEE_MANAGE,
                permissions::REPORT_VIEW,
                permissions::PROFILE_VIEW,
            ],
        ),
        (
            Role::PayrollOfficer,
            &[
                permissions::PAYROLL_VIEW,
                permissions::PAYROLL_MANAGE,
                permissions::EMPLOYEE_VIEW,
                permissions::REPORT_VIEW,
                permissions::PROFILE_VIEW,
            ],
        ),
        (
            Role::Employee,
            &[permissions::PROFILE_VIEW, permissions::PAYROLL_VIEW],
        ),
        (Role::User, &[permissions::PROFILE_VIEW]),
    ];

    for (role, granted) in expected {
        let principal = paygate_test::model::Principal::for_tests("someone", role, true);
        for permission in all {
            assert_eq!(
                env.authz.authorize(&principal, permission),
                granted.contains(&permission),
                "{role} / {permission}"
            );
        }
    }
}

/// ## Summary
/// Test that a deactivated account gets no new principal and that an inactive
/// principal is denied everything.
#[test_log::test(tokio::test)]
async fn deactivation_blocks_new_principals() {
    let env = TestEnv::new().await;
    env.seed("root", Role::Admin).await;
    env.auth.set_active("root", false).await.expect("deactivate");

    assert_eq!(
        env.auth.authenticate("root", PASSWORD).await,
        Err(AuthError::InvalidCredentials)
    );
    let stale = paygate_test::model::Principal::for_tests("root", Role::Admin, false);
    assert!(!env.authz.can_manage_users(&stale));
    assert!(!env.authz.is_admin(&stale));
}
