//! Authorization checks for authenticated principals.
//!
//! Callers pass the [`Principal`] returned by authentication explicitly into
//! every check. Decisions come from the [`PermissionCatalog`] loaded at startup.

use std::sync::Arc;

use paygate_core::types::Principal;

use crate::error::{ServiceError, ServiceResult};

use super::catalog::PermissionCatalog;

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzResult {
    /// Access is allowed.
    Allowed,
    /// Access is denied.
    Denied,
}

impl AuthzResult {
    /// Returns `true` if access is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert to a `Result`, returning `Err(ServiceError::AuthorizationError)` if denied.
    ///
    /// ## Errors
    ///
    /// Returns `AuthorizationError` if access is denied.
    pub fn require(self, principal: &Principal, permission: &str) -> ServiceResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied => Err(ServiceError::AuthorizationError(format!(
                "Access denied: {permission} for {principal}"
            ))),
        }
    }
}

impl From<bool> for AuthzResult {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }
}

/// Authorization service over a shared catalog.
///
/// ## Usage
///
/// ```ignore
/// let principal = authenticator.authenticate("alice", password).await?;
/// authorizer.require(&principal, permissions::PAYROLL_MANAGE)?;
/// ```
#[derive(Debug, Clone)]
pub struct Authorizer {
    catalog: Arc<PermissionCatalog>,
}

impl Authorizer {
    #[must_use]
    pub fn new(catalog: Arc<PermissionCatalog>) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// `true` if `principal` is active and its role carries `permission`.
    #[must_use]
    pub fn authorize(&self, principal: &Principal, permission: &str) -> bool {
        self.catalog.has_permission(principal, permission)
    }

    /// Checks `permission` and logs the decision.
    #[must_use]
    pub fn check(&self, principal: &Principal, permission: &str) -> AuthzResult {
        let result = AuthzResult::from(self.authorize(principal, permission));

        if result.is_allowed() {
            tracing::trace!(%principal, permission, "Authorization allowed");
        } else {
            tracing::debug!(
                %principal,
                permission,
                active = principal.is_active(),
                "Authorization denied"
            );
        }
        result
    }

    /// ## Summary
    /// Checks `permission`, converting a denial into an error.
    ///
    /// ## Errors
    ///
    /// Returns `AuthorizationError` if access is denied.
    pub fn require(&self, principal: &Principal, permission: &str) -> ServiceResult<()> {
        self.check(principal, permission)
            .require(principal, permission)
    }

    #[must_use]
    pub fn is_admin(&self, principal: &Principal) -> bool {
        self.catalog.is_admin(principal)
    }

    #[must_use]
    pub fn has_admin_or_hr_role(&self, principal: &Principal) -> bool {
        self.catalog.has_admin_or_hr_role(principal)
    }

    #[must_use]
    pub fn can_manage_employees(&self, principal: &Principal) -> bool {
        self.catalog.can_manage_employees(principal)
    }

    #[must_use]
    pub fn can_manage_payroll(&self, principal: &Principal) -> bool {
        self.catalog.can_manage_payroll(principal)
    }

    #[must_use]
    pub fn can_manage_users(&self, principal: &Principal) -> bool {
        self.catalog.can_manage_users(principal)
    }
}
