//! Shared utilities and common types for the OTP guard workspace
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types (environment, logging, Redis, throttle policy)
//! - Phone number normalization and masking

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{AppConfig, CacheConfig, Environment, LogFormat, LoggingConfig, ThrottleConfig};
pub use utils::phone;
