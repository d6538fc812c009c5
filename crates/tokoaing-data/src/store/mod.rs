use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::error::StoreError;

pub mod memory;
pub mod push_id;

pub use memory::MemoryStore;

/// Collection names, the de facto schema of the store.
pub mod paths {
    pub const PRODUCTS: &str = "products";
    pub const USERS: &str = "users";
    pub const REVIEWS: &str = "reviews";
    pub const PURCHASE_HISTORY: &str = "purchaseHistory";
    pub const PRIVATE_MESSAGES: &str = "privateMessages";
    pub const CUSTOM_BUTTONS: &str = "customButtons";
}

/// Typed path into the store tree: a collection, a record under it, or a
/// single field of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorePath {
    collection: &'static str,
    key: Option<String>,
    field: Option<&'static str>,
}

impl StorePath {
    pub fn collection(collection: &'static str) -> Self {
        Self {
            collection,
            key: None,
            field: None,
        }
    }

    pub fn record(collection: &'static str, key: impl Into<String>) -> Self {
        Self {
            collection,
            key: Some(key.into()),
            field: None,
        }
    }

    /// Narrow a record path to one of its fields.
    pub fn field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn collection_name(&self) -> &'static str {
        self.collection
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn field_name(&self) -> Option<&'static str> {
        self.field
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection)?;
        if let Some(key) = &self.key {
            write!(f, "/{key}")?;
        }
        if let Some(field) = self.field {
            write!(f, "/{field}")?;
        }
        Ok(())
    }
}

/// Full-collection snapshot: `(key, record)` pairs in key order.
///
/// Push ids are chronologically ordered, so for pushed collections key order
/// is insertion order.
pub type CollectionSnapshot = Arc<Vec<(String, Value)>>;

/// Live handle onto one collection.
///
/// Delivers the current snapshot immediately and a fresh snapshot after
/// every mutation, coalescing bursts to the latest state. Dropping the
/// handle unsubscribes.
pub struct StoreWatch {
    rx: watch::Receiver<CollectionSnapshot>,
    delivered_initial: bool,
}

impl StoreWatch {
    pub(crate) fn new(rx: watch::Receiver<CollectionSnapshot>) -> Self {
        Self {
            rx,
            delivered_initial: false,
        }
    }

    /// Latest snapshot without waiting.
    pub fn current(&self) -> CollectionSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait until the collection changes again. Errors once the store has
    /// been dropped.
    pub async fn changed(&mut self) -> Result<(), StoreError> {
        self.rx
            .changed()
            .await
            .map_err(|_| StoreError::Read("store closed".to_string()))
    }

    /// Next snapshot to deliver: the current one on first call, then one per
    /// change. `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<CollectionSnapshot> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// Snapshot feed as a `Stream`; yields the current snapshot first.
    pub fn into_stream(self) -> WatchStream<CollectionSnapshot> {
        WatchStream::new(self.rx)
    }
}

/// The external realtime database, reduced to the primitives this system
/// uses. `MemoryStore` is the reference backend; remote backends implement
/// the same contract over the wire.
///
/// Mutations fail with [`StoreError::Write`], reads and subscriptions with
/// [`StoreError::Read`]. Removing or updating a missing record is not an
/// error.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Insert `value` under a freshly generated, chronologically ordered
    /// push id and return that id.
    async fn push(&self, collection: &'static str, value: Value) -> Result<String, StoreError>;

    /// Set a keyed record verbatim, replacing any previous value.
    async fn put(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;

    /// Merge `patch` into the record at `path`, creating the record when
    /// absent. Fields not named in the patch are left untouched.
    async fn update(&self, path: &StorePath, patch: Map<String, Value>) -> Result<(), StoreError>;

    /// Delete the record or field at `path`; missing targets no-op.
    async fn remove(&self, path: &StorePath) -> Result<(), StoreError>;

    /// One-shot snapshot read. `None` when nothing exists at `path`.
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;

    /// Subscribe to live full-collection snapshots.
    fn subscribe(&self, collection: &'static str) -> StoreWatch;

    /// Atomic read-modify-write of a single numeric field; the only
    /// concurrency-sensitive primitive in the system. `apply` sees `None`
    /// for a missing or non-numeric prior value and returns the value to
    /// commit, which is also returned to the caller. Remote backends retry
    /// optimistically on conflicting writes.
    async fn transaction_i64(
        &self,
        path: &StorePath,
        apply: &(dyn Fn(Option<i64>) -> i64 + Send + Sync),
    ) -> Result<i64, StoreError>;
}
