//! Structured logging with tracing

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Build the filter, preferring `RUST_LOG` over the configured level
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.level.clone());

    EnvFilter::try_new(&directives).map_err(|source| LoggingError::Filter {
        filter: directives,
        source,
    })
}

/// Initialize the global tracing subscriber
///
/// `logging.format = "json"` emits one JSON object per event, anything else
/// the human-readable format.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().pretty()).try_init()?;
    }

    Ok(())
}
