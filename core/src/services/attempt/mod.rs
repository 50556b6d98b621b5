//! Attempt service: the single entry point for public OTP requests.

mod config;
mod service;

pub use config::AttemptServiceConfig;
pub use service::AttemptService;

#[cfg(test)]
mod tests;
