/// Application name, also used to derive the config file name.
pub const APP_NAME: &str = "paygate";

/// Prefix for environment variable overrides (`PAYGATE_AUTH__MAX_ATTEMPTS=3`).
pub const ENV_PREFIX: &str = "PAYGATE";
pub const ENV_SEPARATOR: &str = "__";

pub const CONFIG_FILE: &str = const_str::concat!(APP_NAME, ".toml");

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOCKOUT_SECS: u64 = 15 * 60;
/// Longest configurable lock (100 years).
pub const MAX_LOCKOUT_SECS: u64 = 100 * 365 * 24 * 60 * 60;
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_BYTES: usize = 1024;

pub const USERNAME_MAX_LENGTH: usize = 64;

/// Argon2id cost defaults (OWASP baseline: 19 MiB, 2 passes, 1 lane).
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19_456;
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;
pub const DEFAULT_HASH_PARALLELISM: u32 = 1;
