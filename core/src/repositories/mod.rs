//! Repository interfaces and in-process implementations.

pub mod attempt;
pub mod audit;

pub use attempt::{AttemptStore, InMemoryAttemptStore, Upserted};
pub use audit::{AuditLogRepository, MockAuditLogRepository, NoOpAuditLogRepository};
