//! Attempt store backed by Redis, shared by every application instance.

mod redis_attempt_store;

pub use redis_attempt_store::{RedisAttemptStore, ATTEMPT_KEY_NAMESPACE};

#[cfg(test)]
mod tests;
