//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `account`: Registration, password changes and administrative unlocks
//! - `authenticate`: Username/password login with lockout (`Authenticator`)
//! - `authorize`: Permission checks for principals (`Authorizer`)
//! - `catalog`: Role to permission catalog loaded from casbin policy text
//! - `lockout`: Failed-attempt counting and lock expiry
//! - `locks`: Per-username async mutex registry
//! - `password`: Salted Argon2id hashing and constant-time verification
//! - `test_support`: Manual clock and counting hasher (`test-support` feature)

pub mod account;
pub mod authenticate;
pub mod authorize;
pub mod catalog;
pub mod lockout;
pub mod locks;
pub mod password;

// Re-export commonly used types at module level
pub use account::LockoutStatus;
pub use authenticate::Authenticator;
pub use authorize::{Authorizer, AuthzResult};
pub use catalog::{DEFAULT_POLICY, PermissionCatalog};
pub use lockout::{Clock, LockState, LockoutPolicy, SystemClock};
pub use password::{Argon2Hasher, CredentialHasher};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
