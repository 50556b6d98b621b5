//! Cache module for Redis connectivity
//!
//! Provides the Redis client shared by the attempt store: startup retry with
//! backoff, a multiplexed connection for plain reads and deletes, and
//! dedicated connections for `WATCH`-based transactions.

pub mod redis_client;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;

// Re-export commonly used types
pub use og_shared::config::cache::CacheConfig;
