//! Redis configuration module

use serde::{Deserialize, Serialize};

/// Redis connection configuration for the attempt store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Number of connection attempts at startup
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,

    /// Optional key prefix, useful when several deployments share one Redis
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: default_connection_timeout(),
            connect_retries: default_connect_retries(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key_prefix = std::env::var("REDIS_KEY_PREFIX").ok().filter(|p| !p.is_empty());

        Self {
            url,
            key_prefix,
            ..Default::default()
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_connect_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.connect_retries, 3);
        assert!(config.key_prefix.is_none());
    }

    #[test]
    fn test_make_key_with_and_without_prefix() {
        let plain = CacheConfig::new("redis://cache:6379");
        assert_eq!(plain.make_key("otp_attempts:abc"), "otp_attempts:abc");

        let prefixed = plain.with_prefix("tenant-a");
        assert_eq!(prefixed.make_key("otp_attempts:abc"), "tenant-a:otp_attempts:abc");
    }
}
