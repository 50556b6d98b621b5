//! Throttle policy: attempt limit, window and lock durations.

use chrono::Duration;
use og_shared::config::ThrottleConfig;

use crate::domain::entities::DEFAULT_HISTORY_CAPACITY;
use crate::errors::{DomainError, DomainResult};

/// Upper bound for the window and lock durations
pub const MAX_POLICY_DURATION_DAYS: i64 = 365;

/// Validated throttle policy
///
/// Only constructible through [`ThrottlePolicy::new`] / [`ThrottlePolicy::from_config`],
/// so a running engine never sees a misconfigured policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottlePolicy {
    max_attempts_per_window: u32,
    window_duration: Duration,
    lock_duration: Duration,
    history_capacity: usize,
}

impl ThrottlePolicy {
    pub fn new(
        max_attempts_per_window: u32,
        window_duration: Duration,
        lock_duration: Duration,
    ) -> DomainResult<Self> {
        Self::with_history_capacity(
            max_attempts_per_window,
            window_duration,
            lock_duration,
            DEFAULT_HISTORY_CAPACITY,
        )
    }

    pub fn with_history_capacity(
        max_attempts_per_window: u32,
        window_duration: Duration,
        lock_duration: Duration,
        history_capacity: usize,
    ) -> DomainResult<Self> {
        let policy = Self {
            max_attempts_per_window,
            window_duration,
            lock_duration,
            history_capacity,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Build from the serde configuration, rejecting unusable values
    pub fn from_config(config: &ThrottleConfig) -> DomainResult<Self> {
        Self::with_history_capacity(
            config.max_attempts_per_window,
            seconds("window_seconds", config.window_seconds)?,
            seconds("lock_duration_seconds", config.lock_duration_seconds)?,
            config.history_capacity,
        )
    }

    fn validate(&self) -> DomainResult<()> {
        if self.max_attempts_per_window == 0 {
            return Err(misconfigured("max_attempts_per_window must be at least 1"));
        }
        if self.window_duration <= Duration::zero() {
            return Err(misconfigured("window duration must be positive"));
        }
        if self.lock_duration <= Duration::zero() {
            return Err(misconfigured("lock duration must be positive"));
        }
        let max_duration = Duration::days(MAX_POLICY_DURATION_DAYS);
        if self.window_duration > max_duration {
            return Err(misconfigured(format!(
                "window duration exceeds {} days",
                MAX_POLICY_DURATION_DAYS
            )));
        }
        if self.lock_duration > max_duration {
            return Err(misconfigured(format!(
                "lock duration exceeds {} days",
                MAX_POLICY_DURATION_DAYS
            )));
        }
        if self.history_capacity == 0 {
            return Err(misconfigured("history capacity must be at least 1"));
        }
        // Otherwise the window count could no longer be derived from history
        if self.history_capacity < self.max_attempts_per_window as usize {
            return Err(misconfigured(format!(
                "history capacity {} is smaller than max_attempts_per_window {}",
                self.history_capacity, self.max_attempts_per_window
            )));
        }
        Ok(())
    }

    pub fn max_attempts_per_window(&self) -> u32 {
        self.max_attempts_per_window
    }

    pub fn window_duration(&self) -> Duration {
        self.window_duration
    }

    pub fn lock_duration(&self) -> Duration {
        self.lock_duration
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }
}

impl Default for ThrottlePolicy {
    /// 3 attempts per 10 minutes, 10 minute lock, 20 history entries
    fn default() -> Self {
        Self {
            max_attempts_per_window: 3,
            window_duration: Duration::minutes(10),
            lock_duration: Duration::minutes(10),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

fn seconds(field: &str, value: u64) -> DomainResult<Duration> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| misconfigured(format!("{} is out of range: {}", field, value)))
}

fn misconfigured(message: impl Into<String>) -> DomainError {
    DomainError::PolicyMisconfiguration {
        message: message.into(),
    }
}
