use std::sync::Arc;

use entity::{CustomButton, CustomButtonPatch};

use crate::error::StoreError;
use crate::store::{paths, RealtimeStore, StorePath};

use super::{encode_patch, encode_record, Feed};

/// Configurable storefront link buttons.
pub struct ButtonsRepository {
    store: Arc<dyn RealtimeStore>,
}

impl ButtonsRepository {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    pub fn subscribe(&self) -> Feed<CustomButton> {
        Feed::unshaped(
            paths::CUSTOM_BUTTONS,
            self.store.subscribe(paths::CUSTOM_BUTTONS),
        )
    }

    pub async fn add(&self, button: &CustomButton) -> Result<String, StoreError> {
        self.store
            .push(paths::CUSTOM_BUTTONS, encode_record(button)?)
            .await
    }

    pub async fn update(&self, id: &str, patch: &CustomButtonPatch) -> Result<(), StoreError> {
        self.store
            .update(
                &StorePath::record(paths::CUSTOM_BUTTONS, id),
                encode_patch(patch)?,
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store
            .remove(&StorePath::record(paths::CUSTOM_BUTTONS, id))
            .await
    }
}
