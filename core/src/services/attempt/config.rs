//! Configuration for the attempt service

use std::time::Duration;

use og_shared::config::ThrottleConfig;

/// Runtime knobs for the attempt service
#[derive(Debug, Clone)]
pub struct AttemptServiceConfig {
    /// Upper bound for every store round-trip
    pub store_timeout: Duration,
    /// Buffer size of the state-change notification channel
    pub event_channel_capacity: usize,
}

impl Default for AttemptServiceConfig {
    fn default() -> Self {
        Self::from(&ThrottleConfig::default())
    }
}

impl From<&ThrottleConfig> for AttemptServiceConfig {
    fn from(config: &ThrottleConfig) -> Self {
        Self {
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            event_channel_capacity: config.event_channel_capacity,
        }
    }
}

impl AttemptServiceConfig {
    /// Store timeout in milliseconds, saturating
    pub fn store_timeout_ms(&self) -> u64 {
        u64::try_from(self.store_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
