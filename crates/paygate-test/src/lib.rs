//! paygate - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `paygate_test::` paths.

pub use paygate_core;
pub use paygate_service;
pub use paygate_store;

pub mod auth {
    pub use paygate_service::auth::*;
    pub use paygate_service::error::{AuthError, AuthResult, ServiceError, ServiceResult};
}

pub mod model {
    pub use paygate_core::types::{Permission, Principal, Role, permissions};
    pub use paygate_store::model::*;
}
