#![forbid(unsafe_code)]

//! Logging bootstrap.
//!
//! Library code only emits `tracing` events. Hosts that want them printed
//! call [`init`] once at process start. `SBX_LOG` overrides the configured
//! filter using the usual `EnvFilter` directive syntax.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before the configured filter.
pub const LOG_ENV: &str = "SBX_LOG";

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {message}")]
    Filter { filter: String, message: String },

    #[error("global subscriber already installed")]
    AlreadyInstalled,
}

/// Resolve the effective filter: `SBX_LOG` first, then `default_filter`.
pub fn resolve_filter(default_filter: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(default_filter).map_err(|err| LoggingError::Filter {
        filter: default_filter.to_string(),
        message: err.to_string(),
    })
}

/// Install the process-wide subscriber.
#[cfg(not(feature = "tracing-json"))]
pub fn init(default_filter: &str) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(resolve_filter(default_filter)?)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}

/// Install the process-wide subscriber, emitting JSON lines.
#[cfg(feature = "tracing-json")]
pub fn init(default_filter: &str) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(resolve_filter(default_filter)?)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}
