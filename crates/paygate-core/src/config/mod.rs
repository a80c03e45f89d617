use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE, DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB, DEFAULT_HASH_PARALLELISM,
    DEFAULT_LOCKOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_PASSWORD_MIN_LENGTH, ENV_PREFIX,
    ENV_SEPARATOR, MAX_LOCKOUT_SECS, PASSWORD_MAX_BYTES,
};
use crate::error::{CoreError, CoreResult};


#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auth: AuthConfig,
    pub hasher: HasherConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// Login and lockout policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Consecutive failures that lock an account.
    pub max_attempts: u32,
    /// How long a lock lasts once the threshold is reached.
    pub lockout_duration_secs: u64,
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_duration_secs: DEFAULT_LOCKOUT_SECS,
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
        }
    }
}

impl AuthConfig {
    /// ## Summary
    /// Returns the lockout duration as a `chrono` delta.
    ///
    /// ## Errors
    /// Returns `ConfigError` if the duration is zero or longer than
    /// [`MAX_LOCKOUT_SECS`].
    pub fn lockout_duration(&self) -> CoreResult<chrono::TimeDelta> {
        Some(self.lockout_duration_secs)
            .filter(|secs| (1..=MAX_LOCKOUT_SECS).contains(secs))
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(chrono::TimeDelta::try_seconds)
            .ok_or_else(|| {
                CoreError::ConfigError(format!(
                    "auth.lockout_duration_secs must be between 1 and {MAX_LOCKOUT_SECS}, got {}",
                    self.lockout_duration_secs
                ))
            })
    }
}

/// Argon2id cost parameters and the optional server-side pepper.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub pepper: Option<String>,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            iterations: DEFAULT_HASH_ITERATIONS,
            parallelism: DEFAULT_HASH_PARALLELISM,
            pepper: None,
        }
    }
}

impl std::fmt::Debug for HasherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HasherConfig")
            .field("memory_kib", &self.memory_kib)
            .field("iterations", &self.iterations)
            .field("parallelism", &self.parallelism)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Where the role→permission catalog comes from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Casbin policy file. The built-in policy is used when unset.
    pub policy_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Returns a builder with the optional config file and environment overrides
    /// registered. Environment variables take precedence over the file.
    #[must_use]
    pub fn builder() -> ConfigBuilder<DefaultState> {
        Config::builder()
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
    }

    /// ## Summary
    /// Deserializes and validates settings from a built `Config`.
    ///
    /// ## Errors
    /// Returns an error if deserialization or validation fails.
    pub fn from_config(config: Config) -> CoreResult<Self> {
        let settings = config.try_deserialize::<Self>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Loads settings from `paygate.toml` and `PAYGATE_*` environment variables.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating fails.
    pub fn load() -> CoreResult<Self> {
        Self::from_config(Self::builder().build()?)
    }

    /// ## Summary
    /// Rejects settings that would disable or weaken the lockout or hashing.
    ///
    /// ## Errors
    /// Returns `ConfigError` naming the first offending key.
    pub fn validate(&self) -> CoreResult<()> {
        if self.auth.max_attempts == 0 {
            return Err(CoreError::ConfigError(
                "auth.max_attempts must be at least 1".to_string(),
            ));
        }
        self.auth.lockout_duration()?;
        if self.auth.password_min_length == 0 || self.auth.password_min_length > PASSWORD_MAX_BYTES
        {
            return Err(CoreError::ConfigError(format!(
                "auth.password_min_length must be between 1 and {PASSWORD_MAX_BYTES}"
            )));
        }
        if self.hasher.iterations == 0 || self.hasher.parallelism == 0 {
            return Err(CoreError::ConfigError(
                "hasher.iterations and hasher.parallelism must be at least 1".to_string(),
            ));
        }
        if self.hasher.memory_kib < self.hasher.parallelism.saturating_mul(8) {
            return Err(CoreError::ConfigError(
                "hasher.memory_kib must be at least 8 KiB per lane".to_string(),
            ));
        }
        if self.hasher.pepper.as_deref() == Some("") {
            return Err(CoreError::ConfigError(
                "hasher.pepper must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or validating the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load().context("failed to load paygate settings")
}
