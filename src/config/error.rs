//! Configuration error types.

use thiserror::Error;

/// A required value is missing or malformed.
///
/// Configuration errors are never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key has no value.
    #[error("missing required configuration value '{key}'")]
    Missing {
        /// The dotted key, or argument name.
        key: String,
    },

    /// A key has a value that cannot be used.
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue {
        /// The dotted key, or argument name.
        key: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// The retry policy would retry forever.
    #[error("invalid retry policy: {0}")]
    InvalidRetryPolicy(&'static str),

    /// The configuration backend itself failed.
    #[error("configuration source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ConfigError {
    pub(crate) fn missing(key: &str) -> Self {
        Self::Missing {
            key: key.to_string(),
        }
    }

    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// The configuration key this error refers to, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Missing { key } | Self::InvalidValue { key, .. } => Some(key),
            Self::InvalidRetryPolicy(_) | Self::Source(_) => None,
        }
    }
}

#[cfg(feature = "figment")]
impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Source(Box::new(e))
    }
}
