//! Credential storage boundary.
//!
//! The authentication core never talks to a database directly. It consumes the
//! [`store::CredentialStore`] contract defined here; [`memory`] provides the
//! in-process implementation used by tests and single-node embeddings.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;
