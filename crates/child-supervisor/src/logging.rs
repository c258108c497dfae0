//! Global `tracing` subscriber setup for binaries embedding the supervisor.
//!
//! The library itself only emits events; installing a subscriber is left to
//! the application, which may call [`init`] once at startup.

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global subscriber according to `config`.
///
/// `RUST_LOG` takes precedence over `config.filter`. Fails if the filter is
/// invalid or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| Error::Logging(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(config.with_target))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init()
    };

    result.map_err(|e| Error::Logging(e.to_string()))
}
