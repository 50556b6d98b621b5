//! # Infrastructure Layer
//!
//! Concrete implementations behind the throttling core:
//! - **Cache**: Redis client with connection retry and dedicated transaction connections
//! - **Store**: `RedisAttemptStore`, the attempt store shared by all instances
//! - **Settings**: layered configuration loading (`.env`, config file, environment)
//! - **Telemetry**: tracing subscriber setup

// Re-export core types for convenience
pub use og_core::errors::*;

/// Cache module - Redis client
pub mod cache;

/// Attempt store implementations
pub mod store;

/// Configuration loading
pub mod settings;

/// Tracing subscriber setup
pub mod telemetry;

/// Service wiring
pub mod bootstrap;

pub use bootstrap::{initialize, ThrottleRuntime};
pub use settings::load_config;
pub use store::RedisAttemptStore;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
