//! Configuration loading for the throttling service
//!
//! Layers, lowest priority first:
//! - `.env` file (via `dotenvy`) feeding the flat variables read by
//!   `AppConfig::from_env` (`OTP_MAX_ATTEMPTS`, `REDIS_URL`, ...)
//! - optional `config.<environment>.{toml,yaml,json}` file
//! - nested `OTP__SECTION__FIELD` variables, e.g. `OTP__THROTTLE__WINDOW_SECONDS`

use og_shared::config::AppConfig;

use crate::InfrastructureError;

/// Load and merge all configuration sources
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let base = AppConfig::from_env();
    let file = base.environment.config_file().to_string();
    build_config(&base, &file)
}

/// Merge `base` with an optional config file and `OTP__*` variables
pub(crate) fn build_config(base: &AppConfig, file: &str) -> Result<AppConfig, InfrastructureError> {
    let defaults = config::Config::try_from(base).map_err(config_error)?;

    let settings = config::Config::builder()
        .add_source(defaults)
        .add_source(config::File::with_name(file).required(false))
        .add_source(
            config::Environment::with_prefix("OTP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .map_err(config_error)?;

    let config: AppConfig = settings.try_deserialize().map_err(config_error)?;
    tracing::debug!(
        environment = %config.environment,
        max_attempts = config.throttle.max_attempts_per_window,
        window_seconds = config.throttle.window_seconds,
        lock_seconds = config.throttle.lock_duration_seconds,
        "Configuration loaded"
    );
    Ok(config)
}

fn config_error(err: config::ConfigError) -> InfrastructureError {
    InfrastructureError::Config(err.to_string())
}
