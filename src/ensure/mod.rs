//! Ensure a database exists with its target throughput.
//!
//! [`DatabaseEnsurer`] resolves everything it needs from configuration first,
//! then acquires a client, runs create-if-absent under the retry policy and
//! optionally replaces the database's throughput.
//!
//! # Example
//!
//! ```rust
//! use database_setup::config::{keys, MemoryConfig};
//! use database_setup::testing::InMemoryStore;
//! use database_setup::{CancellationToken, Database, DatabaseEnsurer};
//!
//! # tokio_test::block_on(async {
//! let config = MemoryConfig::new()
//!     .with(keys::DATABASE_NAME, "orders")
//!     .with(keys::THROUGHPUT, 4000)
//!     .with(keys::THROUGHPUT_MODE, "autoscale");
//! let store = InMemoryStore::new();
//!
//! let ensurer = DatabaseEnsurer::new(config, store.clone());
//! let database = ensurer.ensure(&CancellationToken::new()).await.unwrap();
//!
//! assert_eq!(database.id(), "orders");
//! assert!(store.contains("orders"));
//! # });
//! ```

mod error;

pub use error::{EnsureError, SetupError};

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::cancel::CancellationToken;
use crate::config::{settings, ConfigError, ConfigSource, Settings};
use crate::model::{Credentials, DatabaseId};
use crate::retry::{retry, RetryError, RetryEvent, RetryPolicy};
use crate::store::{ClientProvider, Database, DatabaseClient, StoreError};

/// The database handle type produced by a provider's clients.
pub type DatabaseOf<P> = <<P as ClientProvider>::Client as DatabaseClient>::Database;

/// Key reported when a caller-supplied database name is invalid.
const NAME_ARGUMENT: &str = "name";

/// Ensures databases exist, retrying transient create failures.
///
/// Each call is independent. Concurrent calls for the same database are not
/// coordinated here; create-if-absent on the store keeps them safe.
#[derive(Debug, Clone)]
pub struct DatabaseEnsurer<C, P> {
    config: C,
    provider: P,
    policy: RetryPolicy,
}

impl<C, P> DatabaseEnsurer<C, P>
where
    C: ConfigSource,
    P: ClientProvider,
{
    /// Create an ensurer with [`RetryPolicy::database_default`].
    pub fn new(config: C, provider: P) -> Self {
        Self {
            config,
            provider,
            policy: RetryPolicy::database_default(),
        }
    }

    /// Replace the retry policy used around create-if-absent.
    ///
    /// Fails if the policy does not bound the number of retries.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Result<Self, ConfigError> {
        policy.validate().map_err(ConfigError::InvalidRetryPolicy)?;
        self.policy = policy;
        Ok(self)
    }

    /// The retry policy in use.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The configuration source.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Ensure the database named by `database.name`, using credentials from
    /// `database.endpoint`/`database.account_key` when both are set.
    pub async fn ensure(&self, cancel: &CancellationToken) -> Result<DatabaseOf<P>, EnsureError> {
        let id = settings::database_id(&self.config)?;
        let credentials = settings::credentials(&self.config)?;
        self.ensure_database(id, credentials, cancel).await
    }

    /// Ensure the database `name` using the default client.
    pub async fn ensure_named(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<DatabaseOf<P>, EnsureError> {
        let id = DatabaseId::new(name, NAME_ARGUMENT)?;
        self.ensure_database(id, None, cancel).await
    }

    /// Ensure the database `name` using a dedicated client for the given account.
    pub async fn ensure_with_credentials(
        &self,
        endpoint: &str,
        account_key: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<DatabaseOf<P>, EnsureError> {
        let credentials = Credentials::new(endpoint, account_key)?;
        let id = DatabaseId::new(name, NAME_ARGUMENT)?;
        self.ensure_database(id, Some(credentials), cancel).await
    }

    async fn ensure_database(
        &self,
        id: DatabaseId,
        credentials: Option<Credentials>,
        cancel: &CancellationToken,
    ) -> Result<DatabaseOf<P>, EnsureError> {
        let span = info_span!(
            "ensure_database",
            database = %id,
            dedicated_client = credentials.is_some()
        );
        self.run(id, credentials, cancel).instrument(span).await
    }

    async fn run(
        &self,
        id: DatabaseId,
        credentials: Option<Credentials>,
        cancel: &CancellationToken,
    ) -> Result<DatabaseOf<P>, EnsureError> {
        debug!("ensuring database exists, creating it if absent");

        // Everything configurable is read before the first network call.
        let settings = Settings::resolve(&self.config)?;

        if cancel.is_cancelled() {
            return Err(EnsureError::Cancelled);
        }

        let client = match self.provider.get_client(credentials.as_ref(), cancel).await {
            Ok(client) => client,
            Err(e) if e.is_cancelled() => return Err(EnsureError::Cancelled),
            Err(e) => return Err(abort(SetupError::Client(e))),
        };

        let outcome = retry(
            &self.policy,
            cancel,
            || client.create_database_if_not_exists(&id, &settings.throughput),
            StoreError::is_transient,
            log_retry,
        )
        .await;

        let response = match outcome {
            Ok(response) => response,
            Err(RetryError::Cancelled) => return Err(EnsureError::Cancelled),
            Err(RetryError::Rejected { error, .. }) if error.is_cancelled() => {
                return Err(EnsureError::Cancelled)
            }
            Err(RetryError::Rejected { error, .. }) => {
                return Err(abort(SetupError::Rejected {
                    database: id.to_string(),
                    source: error,
                }))
            }
            Err(RetryError::Exhausted(exhausted)) => {
                return Err(abort(SetupError::RetriesExhausted {
                    database: id.to_string(),
                    source: exhausted,
                }))
            }
        };

        let Some(database) = response.database else {
            return Err(abort(SetupError::MissingDatabase {
                database: id.to_string(),
                diagnostics: response.diagnostics,
            }));
        };

        if response.created {
            info!(throughput = %settings.throughput, "created database");
        } else {
            debug!("database already exists");
        }

        if settings.replace_throughput {
            if cancel.is_cancelled() {
                return Err(EnsureError::Cancelled);
            }

            info!(throughput = %settings.throughput, "setting database throughput");
            let replaced = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EnsureError::Cancelled),
                replaced = database.replace_throughput(&settings.throughput) => replaced,
            };
            match replaced {
                Ok(()) => debug!("finished setting database throughput"),
                Err(e) if e.is_cancelled() => return Err(EnsureError::Cancelled),
                Err(e) => {
                    return Err(abort(SetupError::Throughput {
                        database: id.to_string(),
                        source: e,
                    }))
                }
            }
        }

        Ok(database)
    }
}

fn log_retry(event: &RetryEvent<'_, StoreError>) {
    warn!(
        error = %event.error,
        attempt = event.attempt,
        delay_ms = event.next_delay.as_millis() as u64,
        "failed to ensure database, retrying in {:.3}s",
        event.next_delay.as_secs_f64()
    );
}

fn abort(err: SetupError) -> EnsureError {
    error!(severity = "critical", error = %err, "database setup failed, aborting");
    EnsureError::Setup(err)
}
