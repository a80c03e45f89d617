//! Domain types shared by the store and service crates.
//!
//! A [`Principal`] is the only authenticated identity in the system. It is a
//! plain value handed back by authentication and passed explicitly into every
//! authorization check; nothing in the workspace keeps a "current user" around.

use std::borrow::Borrow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Closed set of roles an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    HrOfficer,
    PayrollOfficer,
    Employee,
    User,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::HrOfficer,
        Self::PayrollOfficer,
        Self::Employee,
        Self::User,
    ];

    /// Canonical name, as used in catalog policy lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::HrOfficer => "HR_OFFICER",
            Self::PayrollOfficer => "PAYROLL_OFFICER",
            Self::Employee => "EMPLOYEE",
            Self::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown role: {s}")))
    }
}

/// Well-known permission identifiers.
pub mod permissions {
    pub const EMPLOYEE_VIEW: &str = "employee.view";
    pub const EMPLOYEE_MANAGE: &str = "employee.manage";
    pub const PAYROLL_VIEW: &str = "payroll.view";
    pub const PAYROLL_MANAGE: &str = "payroll.manage";
    pub const USER_MANAGE: &str = "user.manage";
    pub const REPORT_VIEW: &str = "report.view";
    pub const PROFILE_VIEW: &str = "profile.view";
}

/// An opaque permission identifier such as `employee.manage`.
///
/// Permissions are only ever declared in the catalog; the system never derives
/// them from anything else at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// ## Errors
    /// Returns `InvalidInput` if the identifier is empty or contains whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidInput(format!(
                "invalid permission identifier: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Permission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// An authenticated identity.
///
/// Minted only by the authentication service after a successful login, and
/// only for an active account that is not locked. It has no persistence of
/// its own and is never deserialized, so a principal cannot arrive from
/// outside the process. Authorization of an inactive principal fails closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    username: String,
    role: Role,
    active: bool,
}

impl Principal {
    /// Issues the principal of an account whose password was just verified.
    ///
    /// Reserved for the authentication service. Everything else receives
    /// principals from it.
    #[doc(hidden)]
    #[must_use]
    pub fn issue(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
            active: true,
        }
    }

    /// Builds a principal without authenticating.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn for_tests(username: impl Into<String>, role: Role, active: bool) -> Self {
        Self {
            username: username.into(),
            role,
            active,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.username, self.role)
    }
}
