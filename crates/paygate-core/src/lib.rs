//! Shared building blocks for the paygate workspace: settings, tracing setup,
//! core errors and the role/permission/principal domain types.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;
pub mod types;
pub mod util;
