//! Error taxonomy for ensure calls.

use thiserror::Error;

use crate::config::ConfigError;
use crate::retry::RetryExhausted;
use crate::store::StoreError;

/// Why an ensure call failed.
///
/// Any error means the database's existence and throughput are not guaranteed.
#[derive(Debug, Error)]
pub enum EnsureError {
    /// Missing or malformed configuration or arguments. Nothing was sent to the store.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The caller cancelled.
    #[error("database setup cancelled")]
    Cancelled,

    /// A terminal store-side failure.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

impl EnsureError {
    /// Returns true for [`EnsureError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true for [`EnsureError::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true for [`EnsureError::Setup`].
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }
}

/// Terminal failure while provisioning a database.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The client provider could not supply a client.
    #[error("failed to acquire a store client: {0}")]
    Client(#[source] StoreError),

    /// Create-if-absent failed with an error that is not worth retrying.
    #[error("store rejected creation of database '{database}': {source}")]
    Rejected {
        /// The database name.
        database: String,
        /// The store's error.
        #[source]
        source: StoreError,
    },

    /// Create-if-absent kept failing until the retry policy gave up.
    #[error("stopped retrying creation of database '{database}' after {} attempts: {}", .source.attempts, .source.final_error)]
    RetriesExhausted {
        /// The database name.
        database: String,
        /// The final error and retry metadata.
        #[source]
        source: RetryExhausted<StoreError>,
    },

    /// The store reported success without returning a database.
    #[error("store returned no database for '{database}' (diagnostics: {diagnostics})")]
    MissingDatabase {
        /// The database name.
        database: String,
        /// Diagnostics from the store response.
        diagnostics: String,
    },

    /// Replacing the database's throughput failed.
    #[error("failed to replace throughput of database '{database}': {source}")]
    Throughput {
        /// The database name.
        database: String,
        /// The store's error.
        #[source]
        source: StoreError,
    },
}

impl SetupError {
    /// The last store error behind this failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Client(source)
            | Self::Rejected { source, .. }
            | Self::Throughput { source, .. } => Some(source),
            Self::RetriesExhausted { source, .. } => Some(source.error()),
            Self::MissingDatabase { .. } => None,
        }
    }
}
