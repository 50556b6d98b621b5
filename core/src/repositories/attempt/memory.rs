//! In-process attempt store for single-instance deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::trace;

use crate::domain::entities::AttemptRecord;
use crate::domain::value_objects::Identifier;
use crate::errors::StorageResult;

use super::{AttemptStore, Upserted};

type Slot = Arc<Mutex<Option<AttemptRecord>>>;

/// `AttemptStore` backed by a map of per-identifier mutexes
///
/// The index lock is only held while looking up, inserting or pruning a slot;
/// the read-modify-write itself runs under the identifier's own mutex, so
/// unrelated identifiers proceed in parallel. Deleting a record drops its
/// slot from the index once no other task holds it.
#[derive(Default)]
pub struct InMemoryAttemptStore {
    slots: RwLock<HashMap<Identifier, Slot>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers holding a record
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots.read().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of identifiers with a slot in the index, empty or not
    pub async fn tracked_identifiers(&self) -> usize {
        self.slots.read().await.len()
    }

    async fn existing_slot(&self, identifier: &Identifier) -> Option<Slot> {
        self.slots.read().await.get(identifier).cloned()
    }

    async fn slot(&self, identifier: &Identifier) -> Slot {
        if let Some(slot) = self.existing_slot(identifier).await {
            return slot;
        }
        let mut slots = self.slots.write().await;
        slots
            .entry(identifier.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }
}

impl InMemoryAttemptStore {
    /// Remove an empty slot from the index
    ///
    /// Slots are only handed out under the index lock, so with the write lock
    /// held a strong count of one means no upsert holds or awaits this slot.
    async fn prune(&self, identifier: &Identifier) {
        let mut slots = self.slots.write().await;
        let removable = slots
            .get(identifier)
            .map(|slot| {
                Arc::strong_count(slot) == 1
                    && slot.try_lock().map(|guard| guard.is_none()).unwrap_or(false)
            })
            .unwrap_or(false);
        if removable {
            slots.remove(identifier);
        }
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn get(&self, identifier: &Identifier) -> StorageResult<Option<AttemptRecord>> {
        match self.existing_slot(identifier).await {
            Some(slot) => Ok(slot.lock().await.clone()),
            None => Ok(None),
        }
    }

    async fn upsert<F, T>(&self, identifier: &Identifier, mut mutate: F) -> StorageResult<Upserted<T>>
    where
        F: FnMut(&mut AttemptRecord) -> T + Send,
        T: Send,
    {
        let slot = self.slot(identifier).await;
        let mut guard = slot.lock().await;

        let previous = guard.clone();
        let mut record = previous
            .clone()
            .unwrap_or_else(|| AttemptRecord::new(identifier.clone()));
        let output = mutate(&mut record);
        *guard = Some(record.clone());

        trace!(identifier = %identifier.masked(), "Attempt record committed");

        Ok(Upserted {
            previous,
            record,
            output,
        })
    }

    async fn delete(&self, identifier: &Identifier) -> StorageResult<bool> {
        let existed = match self.existing_slot(identifier).await {
            Some(slot) => slot.lock().await.take().is_some(),
            None => return Ok(false),
        };
        self.prune(identifier).await;
        Ok(existed)
    }
}
