//! Domain entities representing persisted state.

pub mod attempt;
pub mod audit;

pub use attempt::{
    AttemptEvent, AttemptKind, AttemptRecord, IdentifierState, RequestMetadata,
    DEFAULT_HISTORY_CAPACITY,
};
pub use audit::{AuditEventType, AuditLog};
