//! Unit tests for the in-memory attempt store

use std::sync::Arc;

use crate::domain::value_objects::Identifier;
use crate::repositories::attempt::{AttemptStore, InMemoryAttemptStore};

fn phone(raw: &str) -> Identifier {
    Identifier::parse(raw).unwrap()
}

#[tokio::test]
async fn test_get_missing_record_is_none() {
    let store = InMemoryAttemptStore::new();
    assert!(store.get(&phone("+15550100")).await.unwrap().is_none());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_upsert_creates_record_lazily() {
    let store = InMemoryAttemptStore::new();
    let id = phone("+15550100");

    let upserted = store
        .upsert(&id, |record| {
            record.attempt_count += 1;
            record.attempt_count
        })
        .await
        .unwrap();

    assert!(upserted.previous.is_none());
    assert_eq!(upserted.output, 1);
    assert_eq!(upserted.record.identifier, id);
    assert_eq!(store.get(&id).await.unwrap().unwrap().attempt_count, 1);
}

#[tokio::test]
async fn test_upsert_reports_previous_state() {
    let store = InMemoryAttemptStore::new();
    let id = phone("+15550100");

    store.upsert(&id, |record| record.attempt_count = 2).await.unwrap();
    let upserted = store.upsert(&id, |record| record.attempt_count = 5).await.unwrap();

    assert_eq!(upserted.previous.unwrap().attempt_count, 2);
    assert_eq!(upserted.record.attempt_count, 5);
}

#[tokio::test]
async fn test_unchanged_detection() {
    let store = InMemoryAttemptStore::new();
    let id = phone("+15550100");

    store.upsert(&id, |record| record.admin_blocked = true).await.unwrap();
    let upserted = store.upsert(&id, |_| ()).await.unwrap();
    assert!(upserted.is_unchanged());
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let store = InMemoryAttemptStore::new();
    let id = phone("+15550100");

    assert!(!store.delete(&id).await.unwrap());
    store.upsert(&id, |_| ()).await.unwrap();
    assert!(store.delete(&id).await.unwrap());
    assert!(store.get(&id).await.unwrap().is_none());
    assert!(!store.delete(&id).await.unwrap());
}

#[tokio::test]
async fn test_delete_prunes_index() {
    let store = InMemoryAttemptStore::new();
    let kept = phone("+15550100");
    let purged = phone("+15550199");

    store.upsert(&kept, |record| record.attempt_count = 1).await.unwrap();
    store.upsert(&purged, |record| record.attempt_count = 2).await.unwrap();
    assert_eq!(store.tracked_identifiers().await, 2);

    assert!(store.delete(&purged).await.unwrap());
    assert_eq!(store.tracked_identifiers().await, 1);
    assert_eq!(store.len().await, 1);

    // A purged identifier starts fresh
    let upserted = store.upsert(&purged, |record| record.attempt_count += 1).await.unwrap();
    assert!(upserted.previous.is_none());
    assert_eq!(upserted.record.attempt_count, 1);
    assert_eq!(store.tracked_identifiers().await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_racing_upserts_loses_no_writes() {
    let store = Arc::new(InMemoryAttemptStore::new());
    let id = phone("+15550100");

    let mut handles = Vec::new();
    for i in 0..50 {
        let store = Arc::clone(&store);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            if i % 5 == 0 {
                store.delete(&id).await.unwrap();
            } else {
                store.upsert(&id, |record| record.attempt_count += 1).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Whatever survived is visible through the index
    let stored = store.get(&id).await.unwrap();
    assert_eq!(store.len().await, usize::from(stored.is_some()));
    assert!(store.tracked_identifiers().await <= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_are_serialized() {
    let store = Arc::new(InMemoryAttemptStore::new());
    let id = phone("+15550100");

    let mut handles = Vec::new();
    for _ in 0..64 {
        let store = store.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            store
                .upsert(&id, |record| record.attempt_count += 1)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.get(&id).await.unwrap().unwrap().attempt_count, 64);
}

#[tokio::test]
async fn test_identifiers_are_independent() {
    let store = InMemoryAttemptStore::new();
    let a = phone("+15550100");
    let b = phone("+15550199");

    store.upsert(&a, |record| record.attempt_count = 3).await.unwrap();
    store.upsert(&b, |record| record.admin_blocked = true).await.unwrap();

    let a_record = store.get(&a).await.unwrap().unwrap();
    let b_record = store.get(&b).await.unwrap().unwrap();
    assert_eq!(a_record.attempt_count, 3);
    assert!(!a_record.admin_blocked);
    assert_eq!(b_record.attempt_count, 0);
    assert!(b_record.admin_blocked);
    assert_eq!(store.len().await, 2);
}
