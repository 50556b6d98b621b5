//! Business services containing the throttling logic and use cases.

pub mod admin;
pub mod attempt;
pub mod audit;
pub mod clock;
pub mod status;
pub mod throttle;

// Re-export commonly used types
pub use admin::{AdminAck, AdminAction, AdminOverride};
pub use attempt::{AttemptService, AttemptServiceConfig};
pub use audit::{AuditService, AuditServiceConfig};
pub use clock::{Clock, SystemClock};
pub use status::StatusProjector;
pub use throttle::{Evaluation, ThrottleEngine, ThrottlePolicy};
