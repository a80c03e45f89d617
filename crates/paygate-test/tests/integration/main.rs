//! Cross-crate integration tests for authentication and authorization.

mod authentication;
mod authorization;
mod concurrency;
mod helpers;
mod lockout;
