#![forbid(unsafe_code)]

//! Structured logging bootstrap.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! host's decision. Hosts that want line-delimited JSON can call
//! [`init_json`] once at startup.

use std::fmt;

use tracing_subscriber::EnvFilter;

/// Failure to install the global JSON subscriber.
#[derive(Debug)]
pub enum LoggingInitError {
    /// The filter directive string could not be parsed.
    InvalidFilter(String),
    /// A global subscriber was already installed.
    AlreadyInstalled,
}

impl fmt::Display for LoggingInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFilter(reason) => write!(f, "invalid log filter: {reason}"),
            Self::AlreadyInstalled => write!(f, "a global tracing subscriber is already installed"),
        }
    }
}

impl std::error::Error for LoggingInitError {}

/// Install a JSON subscriber filtered by `filter` (e.g. `"brickyard=debug"`).
///
/// `RUST_LOG`, when set, takes precedence over `filter`.
pub fn init_json(filter: &str) -> Result<(), LoggingInitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(filter)
            .map_err(|err| LoggingInitError::InvalidFilter(err.to_string()))?,
    };
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
        .map_err(|_| LoggingInitError::AlreadyInstalled)?;
    tracing::debug!(target: "brickyard.logging", "json subscriber installed");
    Ok(())
}
