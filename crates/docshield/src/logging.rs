//! Global `tracing` subscriber setup for applications embedding the client.
//!
//! The library itself only emits `log` records and `tracing` spans. Hosts that
//! have no subscriber of their own call [`init_logging`] once at startup; `log`
//! records are bridged into `tracing` so both end up in the same output.

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

/// Level used when the configured one cannot be parsed as a filter.
const FALLBACK_LEVEL: &str = "info";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("A global tracing subscriber is already installed: {0}")]
    Subscriber(String),

    #[error("Failed to bridge log records into tracing: {0}")]
    LogBridge(String),
}

/// Builds the filter: `RUST_LOG` wins when set, otherwise the configured level.
pub fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Installs the global subscriber described by `config`.
///
/// Fails if a subscriber or `log` logger is already installed, which makes a
/// second call an error rather than a panic.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(&config.level));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LoggingError::Subscriber(e.to_string()))?;
    LogTracer::init().map_err(|e| LoggingError::LogBridge(e.to_string()))?;

    log::debug!(
        "Logging initialized (level: {}, json: {})",
        config.level,
        config.json
    );
    Ok(())
}
