//! Wiring of the throttling services over a concrete attempt store.

use std::sync::Arc;

use og_core::repositories::{AttemptStore, InMemoryAttemptStore};
use og_core::services::{AdminOverride, AttemptService};
use og_shared::config::AppConfig;
use tracing::info;

use crate::cache::RedisClient;
use crate::settings::load_config;
use crate::store::RedisAttemptStore;
use crate::telemetry::init_tracing;
use crate::InfrastructureError;

/// Services handed to the HTTP layer: the public decision path and the
/// admin console share one store and one event channel
pub struct ThrottleRuntime<S: AttemptStore> {
    pub config: AppConfig,
    pub attempts: Arc<AttemptService<S>>,
    pub admin: AdminOverride<S>,
}

impl<S: AttemptStore> ThrottleRuntime<S> {
    /// Build services over an existing store
    pub fn with_store(config: AppConfig, store: Arc<S>) -> Result<Self, InfrastructureError> {
        let attempts = AttemptService::from_config(store, &config.throttle)
            .map_err(|e| InfrastructureError::Config(e.to_string()))?;
        let attempts = Arc::new(attempts);
        let admin = AdminOverride::new(Arc::clone(&attempts));

        info!(
            environment = %config.environment,
            max_attempts = config.throttle.max_attempts_per_window,
            window_seconds = config.throttle.window_seconds,
            lock_seconds = config.throttle.lock_duration_seconds,
            "Throttle services ready"
        );

        Ok(Self {
            config,
            attempts,
            admin,
        })
    }
}

impl ThrottleRuntime<RedisAttemptStore> {
    /// Connect to Redis and build services over the shared store
    pub async fn connect(config: AppConfig) -> Result<Self, InfrastructureError> {
        let client = RedisClient::new(config.cache.clone()).await?;
        let store = RedisAttemptStore::with_max_cas_retries(client, config.throttle.max_cas_retries);
        Self::with_store(config, Arc::new(store))
    }
}

impl ThrottleRuntime<InMemoryAttemptStore> {
    /// Single-instance deployments and local development
    pub fn in_memory(config: AppConfig) -> Result<Self, InfrastructureError> {
        Self::with_store(config, Arc::new(InMemoryAttemptStore::new()))
    }
}

/// Load configuration, install tracing and connect to Redis
pub async fn initialize() -> Result<ThrottleRuntime<RedisAttemptStore>, InfrastructureError> {
    let config = load_config()?;
    init_tracing(&config.logging)?;

    info!("Initializing infrastructure services...");
    ThrottleRuntime::connect(config).await
}
