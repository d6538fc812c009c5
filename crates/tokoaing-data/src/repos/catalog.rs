use std::sync::Arc;

use entity::{Product, ProductPatch};

use crate::error::StoreError;
use crate::store::{paths, RealtimeStore, StorePath};

use super::{encode_patch, encode_record, Feed};

/// CRUD and live view over the product catalog.
///
/// No validation happens at this layer; admin tooling is trusted with the
/// fields it writes. Stock is only ever decremented by purchase approval;
/// restocking is an explicit admin edit of the field.
pub struct CatalogRepository {
    store: Arc<dyn RealtimeStore>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Full catalog in key (insertion) order, live.
    pub fn subscribe(&self) -> Feed<Product> {
        Feed::unshaped(paths::PRODUCTS, self.store.subscribe(paths::PRODUCTS))
    }

    /// Add a product and return its generated id. The `id` field of the
    /// passed value is ignored.
    pub async fn add(&self, product: &Product) -> Result<String, StoreError> {
        self.store
            .push(paths::PRODUCTS, encode_record(product)?)
            .await
    }

    pub async fn update(&self, id: &str, patch: &ProductPatch) -> Result<(), StoreError> {
        self.store
            .update(&StorePath::record(paths::PRODUCTS, id), encode_patch(patch)?)
            .await
    }

    /// Delete a product. Purchase records that reference it keep their
    /// denormalized name and dangling `product_id`.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store
            .remove(&StorePath::record(paths::PRODUCTS, id))
            .await
    }
}
