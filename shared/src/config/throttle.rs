//! OTP throttling configuration module

use serde::{Deserialize, Serialize};

/// Throttle policy and runtime knobs for OTP issuance
///
/// Durations are plain seconds/milliseconds so the struct deserializes from
/// TOML files and environment variables without custom adapters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Max OTP requests per identifier inside one window
    #[serde(default = "default_max_attempts")]
    pub max_attempts_per_window: u32,

    /// Length of the counting window in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Lockout length in seconds after the limit is exceeded
    #[serde(default = "default_lock_seconds")]
    pub lock_duration_seconds: u64,

    /// Number of attempt events retained per identifier
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Upper bound for a single store round-trip in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Optimistic transaction retries for the Redis store
    #[serde(default = "default_max_cas_retries")]
    pub max_cas_retries: u32,

    /// Buffer size of the state-change notification channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_window: default_max_attempts(),
            window_seconds: default_window_seconds(),
            lock_duration_seconds: default_lock_seconds(),
            history_capacity: default_history_capacity(),
            store_timeout_ms: default_store_timeout_ms(),
            max_cas_retries: default_max_cas_retries(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl ThrottleConfig {
    /// Create from environment variables, falling back to defaults per field
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts_per_window: env_or("OTP_MAX_ATTEMPTS", defaults.max_attempts_per_window),
            window_seconds: env_or("OTP_WINDOW_SECONDS", defaults.window_seconds),
            lock_duration_seconds: env_or("OTP_LOCK_SECONDS", defaults.lock_duration_seconds),
            history_capacity: env_or("OTP_HISTORY_CAPACITY", defaults.history_capacity),
            store_timeout_ms: env_or("OTP_STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            max_cas_retries: env_or("OTP_MAX_CAS_RETRIES", defaults.max_cas_retries),
            event_channel_capacity: env_or("OTP_EVENT_CHANNEL_CAPACITY", defaults.event_channel_capacity),
        }
    }

    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            max_attempts_per_window: 10,
            lock_duration_seconds: 60,
            ..Default::default()
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self::default()
    }
}

fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(fallback)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_window_seconds() -> u64 {
    600 // 10 minutes
}

fn default_lock_seconds() -> u64 {
    600 // 10 minutes
}

fn default_history_capacity() -> usize {
    20
}

fn default_store_timeout_ms() -> u64 {
    2000
}

fn default_max_cas_retries() -> u32 {
    8
}

fn default_event_channel_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_majority_policy() {
        let config = ThrottleConfig::default();
        assert_eq!(config.max_attempts_per_window, 3);
        assert_eq!(config.window_seconds, 600);
        assert_eq!(config.lock_duration_seconds, 600);
        assert_eq!(config.history_capacity, 20);
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: ThrottleConfig =
            serde_json::from_str(r#"{"max_attempts_per_window":5,"window_seconds":900}"#).unwrap();
        assert_eq!(config.max_attempts_per_window, 5);
        assert_eq!(config.window_seconds, 900);
        assert_eq!(config.lock_duration_seconds, 600);
        assert_eq!(config.store_timeout_ms, 2000);
    }

    #[test]
    fn test_development_is_more_lenient() {
        let dev = ThrottleConfig::development();
        assert!(dev.max_attempts_per_window > ThrottleConfig::production().max_attempts_per_window);
    }
}
