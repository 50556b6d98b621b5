//! Concurrent request tests for the AttemptService.

use std::sync::Arc;

use crate::domain::entities::RequestMetadata;
use crate::domain::value_objects::{DenyReason, Identifier};
use crate::repositories::InMemoryAttemptStore;
use crate::services::attempt::{AttemptService, AttemptServiceConfig};
use crate::services::throttle::ThrottlePolicy;

use super::mocks::{phone, t};

fn shared_service() -> Arc<AttemptService<InMemoryAttemptStore>> {
    Arc::new(AttemptService::new(
        Arc::new(InMemoryAttemptStore::new()),
        ThrottlePolicy::default(),
        AttemptServiceConfig::default(),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_allow_exactly_max() {
    let service = shared_service();
    let id = phone();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let service = Arc::clone(&service);
            let id = id.clone();
            tokio::spawn(async move {
                service
                    .evaluate_and_record(&id, t(0), &RequestMetadata::default())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut allowed = 0;
    let mut too_many = 0;
    let mut cooldown = 0;
    for handle in handles {
        let decision = handle.await.unwrap();
        match decision.reason() {
            None => allowed += 1,
            Some(DenyReason::TooManyAttempts) => too_many += 1,
            Some(DenyReason::Cooldown) => cooldown += 1,
            Some(other) => panic!("unexpected deny reason {:?}", other),
        }
    }

    assert_eq!(allowed, 3);
    assert_eq!(too_many, 1);
    assert_eq!(cooldown, 16);

    let record = service.inspect(&id).await.unwrap();
    assert_eq!(record.attempt_count, 3);
    assert_eq!(record.history.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identifiers_do_not_share_attempts() {
    let service = shared_service();
    let ids: Vec<Identifier> = (0..10)
        .map(|i| Identifier::parse(&format!("+1555010{:02}", i)).unwrap())
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .flat_map(|id| (0..3).map(move |_| id.clone()))
        .map(|id| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .evaluate_and_record(&id, t(0), &RequestMetadata::default())
                    .await
                    .unwrap()
                    .is_allowed()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
    for id in &ids {
        assert_eq!(service.inspect(id).await.unwrap().attempt_count, 3);
    }
}
