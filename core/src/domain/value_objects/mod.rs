//! Value objects used by the throttling services.

pub mod decision;
pub mod identifier;
pub mod status;

pub use decision::{Decision, DecisionPayload, DenyReason};
pub use identifier::Identifier;
pub use status::StatusView;
