//! Error types for the supervision core.
//!
//! Most of the core deliberately never returns errors: unmonitored identities
//! and expected terminations are normal outcomes, wait-observation failures
//! are logged and absorbed, and an unexpected child death terminates the
//! process. What remains are the surfaces around the core: loading
//! configuration, installing the log subscriber, and refusing
//! [`Supervisor::watch`](crate::Supervisor::watch) calls that could not be
//! followed through (no pid, no runtime).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file {path}: {source}")]
    ConfigRead {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The global tracing subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// The process handle no longer carries a pid, so it cannot be registered.
    #[error("Process handle has no pid; the child has already been reaped")]
    MissingProcessId,

    /// No tokio runtime is available to run the background wait.
    #[error("No tokio runtime available to wait for child processes")]
    NoRuntime,
}

/// Result type alias defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_read_display_includes_path() {
        let error = Error::ConfigRead {
            path: PathBuf::from("/etc/supervisor.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };

        let message = error.to_string();
        assert!(message.contains("/etc/supervisor.toml"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn test_missing_pid_display() {
        assert!(Error::MissingProcessId.to_string().contains("no pid"));
    }

    #[test]
    fn test_no_runtime_display() {
        assert!(Error::NoRuntime.to_string().contains("tokio runtime"));
    }
}
