//! Status projection for client polling.

mod projector;

pub use projector::StatusProjector;
