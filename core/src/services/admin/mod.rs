//! Operator overrides for the admin console.

mod service;

pub use service::{AdminAck, AdminAction, AdminOverride};
