//! Tracing subscriber setup.

use og_shared::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::InfrastructureError;

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides `logging.level`. Fails if a subscriber is already set.
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), InfrastructureError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| InfrastructureError::Config(format!("Invalid log filter '{}': {}", logging.level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match logging.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(logging.colored)
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(logging.colored)
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .try_init(),
    };

    result.map_err(|e| InfrastructureError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    tracing::info!(level = %logging.level, format = ?logging.format, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let logging = LoggingConfig::default();
        let _ = init_tracing(&logging);
        assert!(init_tracing(&logging).is_err());
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let logging = LoggingConfig {
            level: "og_core=verbose".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init_tracing(&logging), Err(InfrastructureError::Config(_))));
    }
}
