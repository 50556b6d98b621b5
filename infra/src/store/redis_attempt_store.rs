//! Redis implementation of the attempt store.
//!
//! Records live as JSON strings under `otp_attempts:<sha256(identifier)>`
//! without a TTL: history and admin blocks must outlive the lock window.
//! `upsert` is an optimistic transaction (`WATCH` / `GET` / `MULTI` / `SET` /
//! `EXEC`) on a dedicated connection. A concurrent write to the same key
//! aborts `EXEC` and the mutation is re-run against the fresh value.

use async_trait::async_trait;
use redis::aio::Connection;
use redis::{AsyncCommands, RedisError};
use tracing::{debug, trace, warn};

use og_core::domain::entities::AttemptRecord;
use og_core::domain::value_objects::Identifier;
use og_core::errors::{StorageError, StorageResult};
use og_core::repositories::{AttemptStore, Upserted};

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Key namespace for attempt records
pub const ATTEMPT_KEY_NAMESPACE: &str = "otp_attempts";

/// Default bound on optimistic transaction retries
const DEFAULT_MAX_CAS_RETRIES: u32 = 8;

/// Attempt store shared across instances through Redis
#[derive(Clone)]
pub struct RedisAttemptStore {
    client: RedisClient,
    max_cas_retries: u32,
}

impl RedisAttemptStore {
    pub fn new(client: RedisClient) -> Self {
        Self::with_max_cas_retries(client, DEFAULT_MAX_CAS_RETRIES)
    }

    pub fn with_max_cas_retries(client: RedisClient, max_cas_retries: u32) -> Self {
        Self {
            client,
            max_cas_retries,
        }
    }

    /// Storage key for an identifier; the raw phone never appears in Redis
    pub fn key_for(&self, identifier: &Identifier) -> String {
        self.client.make_key(&attempt_key(identifier))
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

/// Unprefixed key for an identifier
pub(crate) fn attempt_key(identifier: &Identifier) -> String {
    format!("{}:{}", ATTEMPT_KEY_NAMESPACE, identifier.hashed())
}

pub(crate) fn decode_record(raw: &str) -> StorageResult<AttemptRecord> {
    Ok(serde_json::from_str(raw)?)
}

pub(crate) fn encode_record(record: &AttemptRecord) -> StorageResult<String> {
    Ok(serde_json::to_string(record)?)
}

fn redis_unavailable(err: RedisError) -> StorageError {
    StorageError::unavailable(err.to_string())
}

fn infra_unavailable(err: InfrastructureError) -> StorageError {
    StorageError::unavailable(err.to_string())
}

async fn unwatch(conn: &mut Connection) -> StorageResult<()> {
    redis::cmd("UNWATCH")
        .query_async::<_, ()>(conn)
        .await
        .map_err(redis_unavailable)
}

#[async_trait]
impl AttemptStore for RedisAttemptStore {
    async fn get(&self, identifier: &Identifier) -> StorageResult<Option<AttemptRecord>> {
        let key = self.key_for(identifier);
        match self.client.get(&key).await.map_err(infra_unavailable)? {
            Some(raw) => decode_record(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn upsert<F, T>(&self, identifier: &Identifier, mut mutate: F) -> StorageResult<Upserted<T>>
    where
        F: FnMut(&mut AttemptRecord) -> T + Send,
        T: Send,
    {
        let key = self.key_for(identifier);
        let mut conn = self
            .client
            .dedicated_connection()
            .await
            .map_err(infra_unavailable)?;

        for attempt in 0..=self.max_cas_retries {
            redis::cmd("WATCH")
                .arg(&key)
                .query_async::<_, ()>(&mut conn)
                .await
                .map_err(redis_unavailable)?;

            let raw: Option<String> = conn.get(&key).await.map_err(redis_unavailable)?;
            let previous = match raw {
                Some(raw) => match decode_record(&raw) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        unwatch(&mut conn).await?;
                        return Err(e);
                    }
                },
                None => None,
            };

            let mut record = previous
                .clone()
                .unwrap_or_else(|| AttemptRecord::new(identifier.clone()));
            let output = mutate(&mut record);

            // Nothing to write; the read under WATCH is already consistent
            if previous.as_ref() == Some(&record) {
                unwatch(&mut conn).await?;
                return Ok(Upserted {
                    previous,
                    record,
                    output,
                });
            }

            let payload = encode_record(&record)?;
            let committed: Option<()> = redis::pipe()
                .atomic()
                .set(&key, payload)
                .ignore()
                .query_async(&mut conn)
                .await
                .map_err(redis_unavailable)?;

            if committed.is_some() {
                trace!(identifier = %identifier.masked(), attempt, "Attempt record committed");
                return Ok(Upserted {
                    previous,
                    record,
                    output,
                });
            }

            debug!(
                identifier = %identifier.masked(),
                attempt,
                "Attempt record changed concurrently, retrying transaction"
            );
        }

        warn!(
            identifier = %identifier.masked(),
            retries = self.max_cas_retries,
            "Giving up on contended attempt record"
        );
        Err(StorageError::Conflict {
            identifier: identifier.masked(),
            retries: self.max_cas_retries,
        })
    }

    async fn delete(&self, identifier: &Identifier) -> StorageResult<bool> {
        let key = self.key_for(identifier);
        self.client.delete(&key).await.map_err(infra_unavailable)
    }
}
