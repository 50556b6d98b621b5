//! Configuration module with business-specific sub-modules
//!
//! - `cache` - Redis connection for the shared attempt store
//! - `environment` - Environment detection and logging configuration
//! - `throttle` - OTP attempt limits, windows and lock durations

pub mod cache;
pub mod environment;
pub mod throttle;

use serde::{Deserialize, Serialize};

pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use throttle::ThrottleConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Throttle policy configuration
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            cache: CacheConfig::default(),
            throttle: ThrottleConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            cache: CacheConfig::default(),
            throttle: ThrottleConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            cache: CacheConfig::new("redis://redis:6379"),
            throttle: ThrottleConfig::production(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            cache: CacheConfig::from_env(),
            throttle: ThrottleConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }
}
