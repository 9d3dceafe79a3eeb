//! The backing-store collaborators.
//!
//! This crate never talks to a database directly. Applications plug their
//! store client in through three traits:
//!
//! - [`ClientProvider`] hands out clients, owning connection pooling,
//!   authentication and any retry around connecting
//! - [`DatabaseClient`] performs create-if-absent
//! - [`Database`] is the handle returned to the caller, able to replace its
//!   throughput
//!
//! [`crate::testing::InMemoryStore`] implements all three.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::cancel::CancellationToken;
use crate::model::{Credentials, DatabaseId, ThroughputSpec};

/// A failed store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A network blip or an unavailable replica.
    #[error("transient store failure: {0}")]
    Transient(String),

    /// The store is rate limiting this account.
    #[error("store throttled the request{}", retry_after_suffix(.retry_after))]
    Throttled {
        /// How long the store asked the caller to wait, if it said.
        retry_after: Option<Duration>,
    },

    /// The call observed cancellation.
    #[error("store call cancelled")]
    Cancelled,

    /// The credentials were refused.
    #[error("store refused the credentials: {0}")]
    Unauthorized(String),

    /// The store refused the request as invalid.
    #[error("store rejected the request: {0}")]
    Rejected(String),
}

fn retry_after_suffix(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {:?})", d),
        None => String::new(),
    }
}

impl StoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Throttled { .. })
    }

    /// Whether the error reports cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// The outcome of a create-if-absent call.
#[derive(Debug, Clone)]
pub struct DatabaseResponse<D> {
    /// The database handle. A well-behaved store always sets it.
    pub database: Option<D>,
    /// True if this call created the database, false if it already existed.
    pub created: bool,
    /// Store diagnostics, reported when `database` is missing.
    pub diagnostics: String,
}

/// A handle to a logical database.
pub trait Database: Send + Sync {
    /// The database name.
    fn id(&self) -> &str;

    /// Set the database's provisioned throughput.
    fn replace_throughput(
        &self,
        throughput: &ThroughputSpec,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// A connected store client.
pub trait DatabaseClient: Send + Sync {
    /// The handle type for databases on this client.
    type Database: Database;

    /// Create the database with `throughput` unless it already exists.
    ///
    /// An existing database is returned untouched.
    fn create_database_if_not_exists(
        &self,
        id: &DatabaseId,
        throughput: &ThroughputSpec,
    ) -> impl Future<Output = Result<DatabaseResponse<Self::Database>, StoreError>> + Send;
}

/// Source of store clients.
pub trait ClientProvider: Send + Sync {
    /// The client type handed out.
    type Client: DatabaseClient;

    /// Get a client for `credentials`, or the shared default client for `None`.
    fn get_client(
        &self,
        credentials: Option<&Credentials>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Self::Client, StoreError>> + Send;
}
