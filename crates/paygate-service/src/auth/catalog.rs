//! Static role to permission catalog.
//!
//! The catalog is written as casbin policy text (`p, ROLE, permission` and
//! `g, ROLE, INHERITED_ROLE`) and evaluated once at startup under the RBAC
//! model in `catalog_model.conf`. The result is materialised into a plain map
//! so that checks after startup never touch the enforcer.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;
use std::sync::LazyLock;

use casbin::{CoreApi, DefaultModel, Enforcer, MgmtApi};
use string_adapter::StringAdapter;

use paygate_core::config::CatalogConfig;
use paygate_core::types::{Permission, Principal, Role, permissions};

use crate::error::{AuthError, ServiceError, ServiceResult};

/// Built-in catalog used when no policy file is configured.
pub const DEFAULT_POLICY: &str = include_str!("default_policy.csv");

static NO_PERMISSIONS: LazyLock<HashSet<Permission>> = LazyLock::new(HashSet::new);

fn config_error(message: impl Into<String>) -> ServiceError {
    ServiceError::AuthError(AuthError::ConfigurationError(message.into()))
}

/// Immutable mapping from every [`Role`] to its permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCatalog {
    roles: HashMap<Role, HashSet<Permission>>,
}

impl PermissionCatalog {
    /// ## Summary
    /// Loads the catalog named by the configuration: the policy file at
    /// `policy_path` if set, the built-in policy otherwise.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` if the file cannot be read or the policy
    /// is invalid.
    #[tracing::instrument(skip(config), fields(policy_path = ?config.policy_path))]
    pub async fn load(config: &CatalogConfig) -> ServiceResult<Self> {
        match &config.policy_path {
            Some(path) => {
                let policy = tokio::fs::read_to_string(path).await.map_err(|e| {
                    config_error(format!(
                        "Failed to read catalog policy {}: {e}",
                        path.display()
                    ))
                })?;
                Self::from_policy(&policy).await
            }
            None => Self::from_policy(DEFAULT_POLICY).await,
        }
    }

    /// ## Summary
    /// Builds the catalog from casbin policy text.
    ///
    /// Every role must end up with at least one permission. Role names must be
    /// canonical (`ADMIN`, `HR_OFFICER`, ...).
    ///
    /// ## Errors
    /// Returns `ConfigurationError` for unknown roles, malformed lines, empty
    /// permission ids or roles without permissions, and `CasbinError` if the
    /// enforcer cannot be built.
    pub async fn from_policy(policy: &str) -> ServiceResult<Self> {
        tracing::debug!("Loading permission catalog");

        let model = DefaultModel::from_str(include_str!("catalog_model.conf")).await?;
        let adapter = StringAdapter::new(policy);
        let enforcer = Enforcer::new(model, adapter).await?;

        let declared = declared_permissions(&enforcer.get_policy())?;
        validate_grouping(&enforcer.get_grouping_policy())?;

        let mut roles = HashMap::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let mut granted = HashSet::new();
            for permission in &declared {
                if enforcer.enforce((role.as_str(), permission.as_str()))? {
                    granted.insert(permission.clone());
                }
            }
            roles.insert(role, granted);
        }

        let catalog = Self::from_map(roles)?;
        tracing::info!(
            policy_count = enforcer.get_policy().len(),
            grouping_count = enforcer.get_grouping_policy().len(),
            permission_count = declared.len(),
            "Permission catalog loaded"
        );
        Ok(catalog)
    }

    /// ## Summary
    /// Wraps an already materialised map.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` if a role is missing or has no permissions.
    pub fn from_map(roles: HashMap<Role, HashSet<Permission>>) -> ServiceResult<Self> {
        for role in Role::ALL {
            if roles.get(&role).is_none_or(HashSet::is_empty) {
                return Err(config_error(format!("Role {role} has no permissions")));
            }
        }
        Ok(Self { roles })
    }

    /// Permissions granted to `role`.
    #[must_use]
    pub fn permissions_for(&self, role: Role) -> &HashSet<Permission> {
        self.roles.get(&role).unwrap_or(&NO_PERMISSIONS)
    }

    /// `true` if `principal` is active and its role carries `permission`.
    #[must_use]
    pub fn has_permission(&self, principal: &Principal, permission: &str) -> bool {
        principal.is_active() && self.permissions_for(principal.role()).contains(permission)
    }

    #[must_use]
    #[expect(clippy::unused_self, reason = "role predicates sit beside the catalog ones")]
    pub fn is_admin(&self, principal: &Principal) -> bool {
        principal.is_active() && principal.role() == Role::Admin
    }

    #[must_use]
    #[expect(clippy::unused_self, reason = "role predicates sit beside the catalog ones")]
    pub fn has_admin_or_hr_role(&self, principal: &Principal) -> bool {
        principal.is_active() && matches!(principal.role(), Role::Admin | Role::HrOfficer)
    }

    #[must_use]
    pub fn can_manage_employees(&self, principal: &Principal) -> bool {
        self.has_permission(principal, permissions::EMPLOYEE_MANAGE)
    }

    #[must_use]
    pub fn can_manage_payroll(&self, principal: &Principal) -> bool {
        self.has_permission(principal, permissions::PAYROLL_MANAGE)
    }

    #[must_use]
    pub fn can_manage_users(&self, principal: &Principal) -> bool {
        self.has_permission(principal, permissions::USER_MANAGE)
    }
}

/// Validates `p` lines and collects the permission ids they declare.
fn declared_permissions(policy: &[Vec<String>]) -> ServiceResult<BTreeSet<Permission>> {
    let mut declared = BTreeSet::new();
    for rule in policy {
        let [role, permission] = rule.as_slice() else {
            return Err(config_error(format!(
                "Catalog policy line must be `p, ROLE, permission`: {rule:?}"
            )));
        };
        Role::from_str(role)
            .map_err(|e| config_error(format!("Catalog policy line {rule:?}: {e}")))?;
        let permission = Permission::new(permission.as_str())
            .map_err(|e| config_error(format!("Catalog policy line {rule:?}: {e}")))?;
        declared.insert(permission);
    }
    Ok(declared)
}

fn validate_grouping(grouping: &[Vec<String>]) -> ServiceResult<()> {
    for rule in grouping {
        let [member, parent] = rule.as_slice() else {
            return Err(config_error(format!(
                "Catalog grouping line must be `g, ROLE, ROLE`: {rule:?}"
            )));
        };
        for name in [member, parent] {
            Role::from_str(name)
                .map_err(|e| config_error(format!("Catalog grouping line {rule:?}: {e}")))?;
        }
    }
    Ok(())
}
