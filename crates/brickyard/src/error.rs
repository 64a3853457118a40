#![forbid(unsafe_code)]

//! Brickyard error model.
//!
//! Forest errors are local and recoverable: the rejected operation changed
//! nothing and the editor keeps running. Configuration errors happen once,
//! before an editor exists.

use std::fmt;

use brickyard_forest::ForestError;

use crate::config::ConfigError;

/// Top-level error type for brickyard editors.
#[derive(Debug)]
pub enum Error {
    /// A forest operation was rejected.
    Forest(ForestError),
    /// Configuration could not be loaded or is invalid.
    Config(ConfigError),
}

/// Standard result type for brickyard APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error type label for tracing fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Forest(_) => "forest",
            Self::Config(_) => "config",
        }
    }

    /// Whether the editor can keep running after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Forest(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forest(e) => write!(f, "forest error: {e}"),
            Self::Config(e) => write!(f, "config error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Forest(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<ForestError> for Error {
    fn from(e: ForestError) -> Self {
        Self::Forest(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
