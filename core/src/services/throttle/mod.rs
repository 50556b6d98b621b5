//! Throttle engine module
//!
//! Pure decision logic for OTP issuance:
//! - Admin block dominates every other rule
//! - A lock in force denies with the remaining cooldown
//! - Expired locks and elapsed windows reset lazily on the next call
//! - Crossing the per-window limit engages a lock

mod engine;
mod policy;

#[cfg(test)]
mod tests;

pub use engine::{Evaluation, ThrottleEngine};
pub use policy::{ThrottlePolicy, MAX_POLICY_DURATION_DAYS};
