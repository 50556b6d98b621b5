//! Attempt store module.

mod r#trait;
pub use r#trait::{AttemptStore, Upserted};

mod memory;
pub use memory::InMemoryAttemptStore;

#[cfg(test)]
mod tests;
