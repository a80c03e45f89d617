//! Tracing subscriber setup for binaries that embed the paygate core.

use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

use crate::config::LoggingConfig;
use crate::error::{CoreError, CoreResult};

/// Handle used to swap the active log filter at runtime.
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// ## Summary
/// Installs a global subscriber with a reloadable `EnvFilter` and a fmt layer,
/// then applies the configured level.
///
/// An invalid level keeps the `info` fallback and logs a warning instead of
/// failing startup.
///
/// ## Errors
/// Returns `ConfigError` if a global subscriber is already installed.
pub fn init_tracing(logging: &LoggingConfig) -> CoreResult<FilterHandle> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .map_err(|e| CoreError::ConfigError(format!("Failed to install tracing subscriber: {e}")))?;

    if let Err(e) = set_level(&filter_handle, &logging.level) {
        tracing::warn!(
            level = %logging.level,
            error = %e,
            "Invalid log level in config, keeping info"
        );
    }

    Ok(filter_handle)
}

/// ## Summary
/// Replaces the active filter with one parsed from `level`.
///
/// ## Errors
/// Returns `ConfigError` if the directive does not parse or the subscriber is gone.
pub fn set_level(handle: &FilterHandle, level: &str) -> CoreResult<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| CoreError::ConfigError(format!("Invalid log filter {level:?}: {e}")))?;

    handle
        .modify(|current| *current = filter)
        .map_err(|e| CoreError::ConfigError(format!("Failed to update log filter: {e}")))
}
