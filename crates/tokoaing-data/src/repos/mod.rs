use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use entity::Keyed;

use crate::error::StoreError;
use crate::store::{CollectionSnapshot, StoreWatch};

pub mod buttons;
pub mod catalog;
pub mod identity;
pub mod leaderboard;
pub mod ledger;
pub mod messages;
pub mod reviews;

pub use buttons::ButtonsRepository;
pub use catalog::CatalogRepository;
pub use identity::IdentityRepository;
pub use leaderboard::{compute_leaderboard, Leaderboard, LeaderboardFeed};
pub use ledger::{NewPurchase, PurchaseDecision, PurchaseLedger, MYSTERY_BOX_NAME};
pub use messages::{MessagingRepository, ANNOUNCEMENT_PREFIX};
pub use reviews::ReviewsRepository;

/// Decode a collection snapshot into typed records, stamping each record's
/// key back into the value. Records that no longer decode are skipped, not
/// fatal; live data can contain entries written by older clients.
pub(crate) fn decode_records<T>(collection: &'static str, snapshot: &[(String, Value)]) -> Vec<T>
where
    T: DeserializeOwned + Keyed,
{
    snapshot
        .iter()
        .filter_map(|(key, value)| match serde_json::from_value::<T>(value.clone()) {
            Ok(mut record) => {
                record.set_key(key);
                Some(record)
            }
            Err(err) => {
                warn!(collection, key = %key, %err, "skipping undecodable record");
                None
            }
        })
        .collect()
}

pub(crate) fn encode_record<T: Serialize>(record: &T) -> Result<Value, StoreError> {
    let value = serde_json::to_value(record).map_err(StoreError::write)?;
    if !value.is_object() {
        return Err(StoreError::Write(
            "records must serialize to JSON objects".to_string(),
        ));
    }
    Ok(value)
}

pub(crate) fn encode_patch<T: Serialize>(patch: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(patch).map_err(StoreError::write)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Write(
            "patches must serialize to JSON objects".to_string(),
        )),
    }
}

/// Typed live feed over one collection.
///
/// Each delivery is the full current collection, decoded and run through
/// the owning repository's filter/ordering. Dropping the feed unsubscribes.
pub struct Feed<T> {
    collection: &'static str,
    watch: StoreWatch,
    shape: Box<dyn Fn(&mut Vec<T>) + Send + Sync>,
}

impl<T: DeserializeOwned + Keyed> Feed<T> {
    pub(crate) fn new(
        collection: &'static str,
        watch: StoreWatch,
        shape: Box<dyn Fn(&mut Vec<T>) + Send + Sync>,
    ) -> Self {
        Self {
            collection,
            watch,
            shape,
        }
    }

    pub(crate) fn unshaped(collection: &'static str, watch: StoreWatch) -> Self {
        Self::new(collection, watch, Box::new(|_| {}))
    }

    fn decode(&self, snapshot: &CollectionSnapshot) -> Vec<T> {
        let mut records = decode_records(self.collection, snapshot);
        (self.shape)(&mut records);
        records
    }

    /// Latest state without waiting.
    pub fn current(&self) -> Vec<T> {
        self.decode(&self.watch.current())
    }

    /// Next delivery: the current state on first call, then one per store
    /// change. `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<Vec<T>> {
        let snapshot = self.watch.next().await?;
        Some(self.decode(&snapshot))
    }
}
