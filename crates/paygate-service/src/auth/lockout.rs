//! Brute-force lockout bookkeeping.
//!
//! Each credential record is in one of two states:
//!
//! - **Active**: `locked_until` is unset or already in the past.
//! - **Locked**: `now < locked_until`. Attempts are rejected before any
//!   hashing happens and the counters are left untouched.
//!
//! Expiry is evaluated lazily when the next attempt arrives; nothing sweeps
//! expired locks in the background. `failed_attempts` keeps counting across an
//! expired lock and only returns to zero on a successful login or an explicit
//! reset, so one more wrong guess after expiry locks the account again.

use chrono::{DateTime, TimeDelta, Utc};

use paygate_core::config::AuthConfig;
use paygate_core::constants::MAX_LOCKOUT_SECS;
use paygate_store::model::CredentialRecord;

use crate::error::{AuthError, AuthResult};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Lock state of a record at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Active,
    Locked { retry_after: DateTime<Utc> },
}

impl LockState {
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}

/// What a recorded failure did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Counter incremented, threshold not reached.
    Counted { failed_attempts: u32, remaining: u32 },
    /// Threshold reached; the account is now locked.
    Locked {
        failed_attempts: u32,
        until: DateTime<Utc>,
    },
}

/// Threshold and duration of the lockout state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_attempts: u32,
    lockout_duration: TimeDelta,
}

impl LockoutPolicy {
    /// ## Errors
    /// Returns `ConfigurationError` if `max_attempts` is zero or the duration is
    /// not positive or exceeds [`MAX_LOCKOUT_SECS`].
    pub fn new(max_attempts: u32, lockout_duration: TimeDelta) -> AuthResult<Self> {
        if max_attempts == 0 {
            return Err(AuthError::ConfigurationError(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if lockout_duration <= TimeDelta::zero() {
            return Err(AuthError::ConfigurationError(
                "lockout duration must be positive".to_string(),
            ));
        }
        if !u64::try_from(lockout_duration.num_seconds()).is_ok_and(|secs| secs <= MAX_LOCKOUT_SECS)
        {
            return Err(AuthError::ConfigurationError(format!(
                "lockout duration must be at most {MAX_LOCKOUT_SECS} seconds"
            )));
        }
        Ok(Self {
            max_attempts,
            lockout_duration,
        })
    }

    /// ## Errors
    /// Returns `ConfigurationError` for an invalid `auth` section.
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let duration = config
            .lockout_duration()
            .map_err(|e| AuthError::ConfigurationError(e.to_string()))?;
        Self::new(config.max_attempts, duration)
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn lockout_duration(&self) -> TimeDelta {
        self.lockout_duration
    }

    /// Evaluates the lock state of `record` at `now`.
    #[must_use]
    pub fn state(&self, record: &CredentialRecord, now: DateTime<Utc>) -> LockState {
        match record.locked_until {
            Some(until) if now < until => LockState::Locked { retry_after: until },
            _ => LockState::Active,
        }
    }

    /// ## Summary
    /// Applies the failure transition to an active record.
    ///
    /// Increments the counter and, once it reaches the threshold, sets
    /// `locked_until = now + lockout_duration`.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` if the lock expiry falls outside the
    /// representable date range. The record is left untouched in that case.
    pub fn record_failure(
        &self,
        record: &mut CredentialRecord,
        now: DateTime<Utc>,
    ) -> AuthResult<FailureOutcome> {
        debug_assert!(!self.state(record, now).is_locked());

        let failed_attempts = record.failed_attempts.saturating_add(1);
        if failed_attempts < self.max_attempts {
            record.failed_attempts = failed_attempts;
            return Ok(FailureOutcome::Counted {
                failed_attempts,
                remaining: self.max_attempts - failed_attempts,
            });
        }

        let until = now
            .checked_add_signed(self.lockout_duration)
            .ok_or_else(|| {
                AuthError::ConfigurationError(format!(
                    "lock expiry out of range: {now} + {}",
                    self.lockout_duration
                ))
            })?;
        record.failed_attempts = failed_attempts;
        record.locked_until = Some(until);
        Ok(FailureOutcome::Locked {
            failed_attempts,
            until,
        })
    }

    /// ## Summary
    /// Applies the success transition: clears the counter and any lock.
    ///
    /// Returns `true` if the record changed and needs to be persisted.
    pub fn record_success(&self, record: &mut CredentialRecord) -> bool {
        self.reset(record)
    }

    /// ## Summary
    /// Explicit reset used by password resets and administrative unlocks.
    ///
    /// Returns `true` if the record changed.
    pub fn reset(&self, record: &mut CredentialRecord) -> bool {
        let changed = record.failed_attempts != 0 || record.locked_until.is_some();
        record.failed_attempts = 0;
        record.locked_until = None;
        changed
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: paygate_core::constants::DEFAULT_MAX_ATTEMPTS,
            lockout_duration: TimeDelta::minutes(15),
        }
    }
}
