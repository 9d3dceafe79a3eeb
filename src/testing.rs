//! An in-process store for tests and local development.
//!
//! [`InMemoryStore`] implements [`ClientProvider`], its clients implement
//! [`DatabaseClient`] and its handles implement [`Database`]. Failures can be
//! scripted so that retry, cancellation and error paths are exercised without
//! a real store.
//!
//! ```rust
//! use database_setup::store::StoreError;
//! use database_setup::testing::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! store.fail_creates_with([
//!     StoreError::Transient("connection reset".to_string()),
//!     StoreError::Throttled { retry_after: None },
//! ]);
//!
//! assert_eq!(store.create_calls(), 0);
//! assert!(!store.contains("orders"));
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::cancel::CancellationToken;
use crate::model::{Credentials, DatabaseId, ThroughputSpec};
use crate::store::{ClientProvider, Database, DatabaseClient, DatabaseResponse, StoreError};

#[derive(Debug, Default)]
struct State {
    databases: HashMap<String, ThroughputSpec>,
    create_failures: VecDeque<StoreError>,
    create_times: Vec<Instant>,
    client_requests: Vec<Option<Credentials>>,
    client_failure: Option<StoreError>,
    throughput_failure: Option<StoreError>,
    throughput_replacements: Vec<(String, ThroughputSpec)>,
    hang_creates: bool,
    hang_throughput: bool,
    omit_database: bool,
}

/// A shared, cloneable in-memory store. Clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue errors returned by the next create-if-absent calls, in order.
    pub fn fail_creates_with(&self, errors: impl IntoIterator<Item = StoreError>) {
        self.lock().create_failures.extend(errors);
    }

    /// Make every `get_client` call fail with `error`.
    pub fn fail_clients_with(&self, error: StoreError) {
        self.lock().client_failure = Some(error);
    }

    /// Make every throughput replacement fail with `error`.
    pub fn fail_throughput_with(&self, error: StoreError) {
        self.lock().throughput_failure = Some(error);
    }

    /// Make create-if-absent calls never complete.
    pub fn hang_creates(&self) {
        self.lock().hang_creates = true;
    }

    /// Make throughput replacements never complete.
    pub fn hang_throughput_replacements(&self) {
        self.lock().hang_throughput = true;
    }

    /// Make create-if-absent succeed without returning a database.
    pub fn omit_database(&self) {
        self.lock().omit_database = true;
    }

    /// Insert a database directly, as if someone else created it.
    pub fn insert(&self, name: &str, throughput: ThroughputSpec) {
        self.lock().databases.insert(name.to_string(), throughput);
    }

    /// Whether the database exists.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().databases.contains_key(name)
    }

    /// The database's current throughput, if it exists.
    pub fn throughput(&self, name: &str) -> Option<ThroughputSpec> {
        self.lock().databases.get(name).copied()
    }

    /// Number of create-if-absent calls, including failed ones.
    pub fn create_calls(&self) -> usize {
        self.lock().create_times.len()
    }

    /// When each create-if-absent call started, in tokio time.
    pub fn create_times(&self) -> Vec<Instant> {
        self.lock().create_times.clone()
    }

    /// Credentials passed to each `get_client` call.
    pub fn client_requests(&self) -> Vec<Option<Credentials>> {
        self.lock().client_requests.clone()
    }

    /// Every successful throughput replacement, in order.
    pub fn throughput_replacements(&self) -> Vec<(String, ThroughputSpec)> {
        self.lock().throughput_replacements.clone()
    }
}

/// A client of an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryClient {
    store: InMemoryStore,
    credentials: Option<Credentials>,
}

impl InMemoryClient {
    /// The credentials this client was created with.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// A database handle from an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    store: InMemoryStore,
    id: String,
}

impl ClientProvider for InMemoryStore {
    type Client = InMemoryClient;

    async fn get_client(
        &self,
        credentials: Option<&Credentials>,
        cancel: &CancellationToken,
    ) -> Result<Self::Client, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let mut state = self.lock();
        state.client_requests.push(credentials.cloned());
        if let Some(error) = state.client_failure.clone() {
            return Err(error);
        }

        Ok(InMemoryClient {
            store: self.clone(),
            credentials: credentials.cloned(),
        })
    }
}

impl DatabaseClient for InMemoryClient {
    type Database = InMemoryDatabase;

    async fn create_database_if_not_exists(
        &self,
        id: &DatabaseId,
        throughput: &ThroughputSpec,
    ) -> Result<DatabaseResponse<Self::Database>, StoreError> {
        let hang = {
            let mut state = self.store.lock();
            state.create_times.push(Instant::now());
            if let Some(error) = state.create_failures.pop_front() {
                return Err(error);
            }
            state.hang_creates
        };

        if hang {
            std::future::pending::<()>().await;
        }

        let mut state = self.store.lock();
        if state.omit_database {
            return Ok(DatabaseResponse {
                database: None,
                created: false,
                diagnostics: format!("no resource returned for '{}'", id),
            });
        }

        let created = !state.databases.contains_key(id.as_str());
        state
            .databases
            .entry(id.as_str().to_string())
            .or_insert(*throughput);

        Ok(DatabaseResponse {
            database: Some(InMemoryDatabase {
                store: self.store.clone(),
                id: id.as_str().to_string(),
            }),
            created,
            diagnostics: String::new(),
        })
    }
}

impl Database for InMemoryDatabase {
    fn id(&self) -> &str {
        &self.id
    }

    async fn replace_throughput(&self, throughput: &ThroughputSpec) -> Result<(), StoreError> {
        let hang = {
            let state = self.store.lock();
            if let Some(error) = state.throughput_failure.clone() {
                return Err(error);
            }
            state.hang_throughput
        };

        if hang {
            std::future::pending::<()>().await;
        }

        let mut state = self.store.lock();

        match state.databases.get_mut(&self.id) {
            Some(current) => {
                *current = *throughput;
                state
                    .throughput_replacements
                    .push((self.id.clone(), *throughput));
                Ok(())
            }
            None => Err(StoreError::Rejected(format!(
                "database '{}' does not exist",
                self.id
            ))),
        }
    }
}
