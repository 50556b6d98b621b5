//! # OTP Guard Core
//!
//! Domain layer of the OTP issuance throttle.
//! This crate contains the attempt model, the window/lock engine, the attempt
//! store contract with an in-memory implementation, and the services the
//! public endpoint and the admin console call.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
