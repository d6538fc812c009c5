use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::{Map, Value};

use entity::{PrivateMessage, User, UserRole};

use crate::error::StoreError;
use crate::store::{paths, RealtimeStore, StorePath};
use crate::util::{now_rfc3339, parse_rfc3339};

use super::{encode_record, Feed};

/// Marker prepended to announcement fan-outs.
pub const ANNOUNCEMENT_PREFIX: &str = "[PENGUMUMAN]";

/// Private messages from the shop to its users.
///
/// There is no global channel: an announcement is one private message per
/// recipient.
pub struct MessagingRepository {
    store: Arc<dyn RealtimeStore>,
}

impl MessagingRepository {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// One user's inbox, newest first, live.
    pub fn subscribe(&self, user_id: &str) -> Feed<PrivateMessage> {
        let uid = user_id.to_string();
        Feed::new(
            paths::PRIVATE_MESSAGES,
            self.store.subscribe(paths::PRIVATE_MESSAGES),
            Box::new(move |messages: &mut Vec<PrivateMessage>| {
                messages.retain(|message| message.user_id == uid);
                messages.sort_by(|a, b| {
                    parse_rfc3339(&b.timestamp)
                        .cmp(&parse_rfc3339(&a.timestamp))
                        .then_with(|| b.id.cmp(&a.id))
                });
            }),
        )
    }

    pub async fn send(&self, user_id: &str, text: &str) -> Result<String, StoreError> {
        let message = PrivateMessage {
            id: String::new(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            timestamp: now_rfc3339(),
            is_read: false,
        };
        self.store
            .push(paths::PRIVATE_MESSAGES, encode_record(&message)?)
            .await
    }

    /// Fan `text` out as a `[PENGUMUMAN]`-prefixed private message to every
    /// regular user in `users`.
    pub async fn send_announcement(&self, text: &str, users: &[User]) -> Result<(), StoreError> {
        let body = format!("{ANNOUNCEMENT_PREFIX} {text}");
        let sends = users
            .iter()
            .filter(|user| user.role == UserRole::User)
            .map(|user| self.send(&user.uid, &body));
        try_join_all(sends).await?;
        Ok(())
    }

    pub async fn mark_read(&self, message_id: &str) -> Result<(), StoreError> {
        let mut patch = Map::new();
        patch.insert("isRead".to_string(), Value::Bool(true));
        self.store
            .update(
                &StorePath::record(paths::PRIVATE_MESSAGES, message_id),
                patch,
            )
            .await
    }
}
