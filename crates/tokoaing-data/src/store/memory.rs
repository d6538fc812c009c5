use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::warn;

use crate::error::StoreError;

use super::push_id::PushIdGenerator;
use super::{CollectionSnapshot, RealtimeStore, StorePath, StoreWatch};

struct CollectionCell {
    records: Mutex<BTreeMap<String, Value>>,
    tx: watch::Sender<CollectionSnapshot>,
}

impl CollectionCell {
    fn new() -> Self {
        let empty: CollectionSnapshot = Arc::new(Vec::new());
        let (tx, _) = watch::channel(empty);
        Self {
            records: Mutex::new(BTreeMap::new()),
            tx,
        }
    }

    /// Publish the current state while the records lock is held, so
    /// snapshots go out in mutation order.
    fn publish(&self, records: &BTreeMap<String, Value>) {
        let snapshot: CollectionSnapshot = Arc::new(
            records
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        );
        self.tx.send_replace(snapshot);
    }
}

/// In-memory reference backend.
///
/// Every mutation of a collection runs under that collection's lock, so the
/// single-field transactions the purchase flow depends on are trivially
/// atomic here. Remote backends implement the same trait with optimistic
/// retry instead.
pub struct MemoryStore {
    collections: Mutex<HashMap<&'static str, Arc<CollectionCell>>>,
    ids: PushIdGenerator,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            ids: PushIdGenerator::new(),
        }
    }

    fn cell(&self, collection: &'static str) -> Arc<CollectionCell> {
        self.collections
            .lock()
            .entry(collection)
            .or_insert_with(|| Arc::new(CollectionCell::new()))
            .clone()
    }

    fn existing_cell(&self, collection: &'static str) -> Option<Arc<CollectionCell>> {
        self.collections.lock().get(collection).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn record_key<'p>(path: &'p StorePath, op: &str) -> Result<&'p str, StoreError> {
    path.key()
        .ok_or_else(|| StoreError::Write(format!("{op} needs a record path, got {path}")))
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn push(&self, collection: &'static str, value: Value) -> Result<String, StoreError> {
        let id = self.ids.next_id();
        let cell = self.cell(collection);
        let mut records = cell.records.lock();
        records.insert(id.clone(), value);
        cell.publish(&records);
        Ok(id)
    }

    async fn put(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let key = record_key(path, "put")?;
        if path.field_name().is_some() {
            return Err(StoreError::Write(format!(
                "put operates on whole records, got {path}"
            )));
        }

        let cell = self.cell(path.collection_name());
        let mut records = cell.records.lock();
        records.insert(key.to_string(), value);
        cell.publish(&records);
        Ok(())
    }

    async fn update(&self, path: &StorePath, patch: Map<String, Value>) -> Result<(), StoreError> {
        let key = record_key(path, "update")?;
        if path.field_name().is_some() {
            return Err(StoreError::Write(format!(
                "update operates on whole records, got {path}"
            )));
        }

        let cell = self.cell(path.collection_name());
        let mut records = cell.records.lock();
        let record = records
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !record.is_object() {
            warn!(%path, "replacing non-object record on update");
            *record = Value::Object(Map::new());
        }
        if let Some(fields) = record.as_object_mut() {
            for (name, value) in patch {
                fields.insert(name, value);
            }
        }
        cell.publish(&records);
        Ok(())
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        let key = record_key(path, "remove")?;
        let Some(cell) = self.existing_cell(path.collection_name()) else {
            return Ok(());
        };

        let mut records = cell.records.lock();
        let changed = match path.field_name() {
            None => records.remove(key).is_some(),
            Some(field) => records
                .get_mut(key)
                .and_then(Value::as_object_mut)
                .map(|fields| fields.remove(field).is_some())
                .unwrap_or(false),
        };
        if changed {
            cell.publish(&records);
        }
        Ok(())
    }

    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let Some(cell) = self.existing_cell(path.collection_name()) else {
            return Ok(None);
        };
        let records = cell.records.lock();

        let Some(key) = path.key() else {
            if records.is_empty() {
                return Ok(None);
            }
            let all: Map<String, Value> = records
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            return Ok(Some(Value::Object(all)));
        };

        let record = records.get(key);
        Ok(match path.field_name() {
            None => record.cloned(),
            Some(field) => record.and_then(|r| r.get(field)).cloned(),
        })
    }

    fn subscribe(&self, collection: &'static str) -> StoreWatch {
        StoreWatch::new(self.cell(collection).tx.subscribe())
    }

    async fn transaction_i64(
        &self,
        path: &StorePath,
        apply: &(dyn Fn(Option<i64>) -> i64 + Send + Sync),
    ) -> Result<i64, StoreError> {
        let key = record_key(path, "transaction")?;
        let Some(field) = path.field_name() else {
            return Err(StoreError::Write(format!(
                "transaction needs a field path, got {path}"
            )));
        };

        let cell = self.cell(path.collection_name());
        let mut records = cell.records.lock();
        let record = records
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !record.is_object() {
            warn!(%path, "replacing non-object record on transaction");
            *record = Value::Object(Map::new());
        }

        let current = record.get(field).and_then(Value::as_i64);
        let next = apply(current);
        if let Some(fields) = record.as_object_mut() {
            fields.insert(field.to_string(), Value::from(next));
        }
        cell.publish(&records);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::paths;

    #[tokio::test]
    async fn push_then_get_round_trips() {
        let store = MemoryStore::new();
        let id = store
            .push(paths::REVIEWS, json!({"author": "aing", "text": "mantap"}))
            .await
            .unwrap();

        let record = store
            .get(&StorePath::record(paths::REVIEWS, id.as_str()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record["author"], "aing");
    }

    #[tokio::test]
    async fn update_merges_without_touching_other_fields() {
        let store = MemoryStore::new();
        let path = StorePath::record(paths::USERS, "u1");
        store
            .put(&path, json!({"nickname": "aing", "isActive": true}))
            .await
            .unwrap();

        let mut patch = Map::new();
        patch.insert("isActive".to_string(), Value::Bool(false));
        store.update(&path, patch).await.unwrap();

        let record = store.get(&path).await.unwrap().unwrap();
        assert_eq!(record["nickname"], "aing");
        assert_eq!(record["isActive"], false);
    }

    #[tokio::test]
    async fn removing_a_missing_record_is_a_no_op() {
        let store = MemoryStore::new();
        store
            .remove(&StorePath::record(paths::PRODUCTS, "nope"))
            .await
            .unwrap();
        assert!(store
            .get(&StorePath::collection(paths::PRODUCTS))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn transaction_treats_a_missing_field_as_absent() {
        let store = MemoryStore::new();
        let counter = StorePath::record(paths::USERS, "u1").field("mysteryBoxAttempts");

        let value = store
            .transaction_i64(&counter, &|current| current.unwrap_or(0) + 1)
            .await
            .unwrap();
        assert_eq!(value, 1);

        let value = store
            .transaction_i64(&counter, &|current| current.unwrap_or(0) + 1)
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn subscription_sees_the_initial_state_then_each_change() {
        let store = MemoryStore::new();
        let mut watch = store.subscribe(paths::PRODUCTS);

        let initial = watch.next().await.unwrap();
        assert!(initial.is_empty());

        store
            .push(paths::PRODUCTS, json!({"name": "Sticker Pack"}))
            .await
            .unwrap();
        let after = watch.next().await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].1["name"], "Sticker Pack");
    }
}
