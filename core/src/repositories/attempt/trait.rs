//! Attempt store trait defining the interface for per-identifier attempt state.

use async_trait::async_trait;

use crate::domain::entities::AttemptRecord;
use crate::domain::value_objects::Identifier;
use crate::errors::StorageResult;

/// Result of an atomic read-modify-write
#[derive(Debug, Clone)]
pub struct Upserted<T> {
    /// State before the mutation; `None` for a never-seen identifier
    pub previous: Option<AttemptRecord>,
    /// State committed by the mutation
    pub record: AttemptRecord,
    /// Whatever the mutation returned (the engine decision, an ack, ...)
    pub output: T,
}

impl<T> Upserted<T> {
    /// True when the mutation left the record untouched
    pub fn is_unchanged(&self) -> bool {
        self.previous.as_ref() == Some(&self.record)
    }
}

/// Durable per-identifier attempt state
///
/// Implementations must serialize `upsert` per identifier: two concurrent
/// calls for the same identifier never both observe the same `previous`
/// state. Different identifiers must not contend with each other.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Read the current record, if any
    ///
    /// May be served from a slightly stale replica; only `upsert` is
    /// authoritative.
    async fn get(&self, identifier: &Identifier) -> StorageResult<Option<AttemptRecord>>;

    /// Atomically apply `mutate` to the record and persist the result
    ///
    /// A missing record starts as `AttemptRecord::new(identifier)`.
    /// Optimistic backends may invoke `mutate` more than once; only the
    /// invocation whose write commits is reflected in the result.
    async fn upsert<F, T>(&self, identifier: &Identifier, mutate: F) -> StorageResult<Upserted<T>>
    where
        F: FnMut(&mut AttemptRecord) -> T + Send,
        T: Send;

    /// Remove the record; returns whether one existed
    async fn delete(&self, identifier: &Identifier) -> StorageResult<bool>;
}
