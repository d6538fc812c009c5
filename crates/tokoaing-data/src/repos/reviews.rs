use std::sync::Arc;

use entity::{Review, ReviewPatch};

use crate::error::StoreError;
use crate::store::{paths, RealtimeStore, StorePath};
use crate::util::{now_rfc3339, parse_rfc3339};

use super::{encode_patch, encode_record, Feed};

/// Shop reviews; independent of the purchase flow.
pub struct ReviewsRepository {
    store: Arc<dyn RealtimeStore>,
}

impl ReviewsRepository {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// All reviews, newest first, live.
    pub fn subscribe(&self) -> Feed<Review> {
        Feed::new(
            paths::REVIEWS,
            self.store.subscribe(paths::REVIEWS),
            Box::new(|reviews: &mut Vec<Review>| {
                reviews.sort_by(|a, b| {
                    parse_rfc3339(&b.created_at)
                        .cmp(&parse_rfc3339(&a.created_at))
                        .then_with(|| b.id.cmp(&a.id))
                });
            }),
        )
    }

    /// Add a review stamped with the current time; returns its id.
    pub async fn add(&self, author: &str, text: &str) -> Result<String, StoreError> {
        let review = Review {
            id: String::new(),
            author: author.to_string(),
            text: text.to_string(),
            created_at: now_rfc3339(),
        };
        self.store
            .push(paths::REVIEWS, encode_record(&review)?)
            .await
    }

    pub async fn update(&self, id: &str, patch: &ReviewPatch) -> Result<(), StoreError> {
        self.store
            .update(&StorePath::record(paths::REVIEWS, id), encode_patch(patch)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store
            .remove(&StorePath::record(paths::REVIEWS, id))
            .await
    }
}
