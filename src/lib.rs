//! # database-setup
//!
//! Ensure a document database's logical database exists with its target
//! throughput, retrying transient failures with exponential backoff and jitter.
//!
//! The crate owns one operation and borrows everything else:
//! - **Configuration** comes from a [`ConfigSource`](config::ConfigSource)
//! - **Store access** goes through a [`ClientProvider`](store::ClientProvider)
//! - **Logging** is emitted as `tracing` events; install any subscriber
//!
//! ## Quick Example
//!
//! ```rust
//! use database_setup::config::{keys, MemoryConfig};
//! use database_setup::store::StoreError;
//! use database_setup::testing::InMemoryStore;
//! use database_setup::{CancellationToken, DatabaseEnsurer, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let config = MemoryConfig::new()
//!     .with(keys::THROUGHPUT, 400)
//!     .with(keys::THROUGHPUT_MODE, "manual")
//!     .with(keys::REPLACE_THROUGHPUT, true);
//!
//! let store = InMemoryStore::new();
//! store.fail_creates_with([StoreError::Transient("connection reset".into())]);
//!
//! let ensurer = DatabaseEnsurer::new(config, store.clone())
//!     .with_retry_policy(RetryPolicy::constant(Duration::from_millis(1)).with_max_retries(5))
//!     .unwrap();
//!
//! ensurer
//!     .ensure_named("inventory", &CancellationToken::new())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(store.create_calls(), 2);
//! assert_eq!(store.throughput("inventory").unwrap().units(), 400);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cancel;
pub mod config;
pub mod ensure;
pub mod model;
pub mod retry;
pub mod store;
pub mod testing;

// Re-exports
pub use cancel::CancellationToken;
pub use ensure::{DatabaseEnsurer, DatabaseOf, EnsureError, SetupError};
pub use model::{AccountKey, Credentials, DatabaseId, ThroughputMode, ThroughputSpec};
pub use retry::{
    retry, JitterStrategy, RetryError, RetryEvent, RetryExhausted, RetryPolicy, RetryStrategy,
};
pub use store::{ClientProvider, Database, DatabaseClient, DatabaseResponse, StoreError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancel::CancellationToken;
    pub use crate::config::{ConfigSource, MemoryConfig};
    pub use crate::ensure::{DatabaseEnsurer, EnsureError, SetupError};
    pub use crate::model::{ThroughputMode, ThroughputSpec};
    pub use crate::retry::RetryPolicy;
    pub use crate::store::{ClientProvider, Database, DatabaseClient, StoreError};
}
