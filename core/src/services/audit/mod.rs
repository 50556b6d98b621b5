//! Audit service module for recording throttling decisions and operator actions.

mod service;

pub use service::{AuditService, AuditServiceConfig};
