use std::sync::Arc;

use entity::{Keyed, User, UserPatch, UserRole};

use crate::error::StoreError;
use crate::store::{paths, RealtimeStore, StorePath};
use crate::util::now_rfc3339;

use super::{encode_patch, encode_record, Feed};

/// Shop accounts, keyed by the identity-provider subject.
///
/// Authentication itself lives with the external provider; this repository
/// only mirrors its accounts into `users` records.
pub struct IdentityRepository {
    store: Arc<dyn RealtimeStore>,
}

impl IdentityRepository {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    pub fn subscribe(&self) -> Feed<User> {
        Feed::unshaped(paths::USERS, self.store.subscribe(paths::USERS))
    }

    pub async fn get(&self, uid: &str) -> Result<Option<User>, StoreError> {
        let Some(value) = self
            .store
            .get(&StorePath::record(paths::USERS, uid))
            .await?
        else {
            return Ok(None);
        };

        let mut user: User = serde_json::from_value(value).map_err(StoreError::read)?;
        user.set_key(uid);
        Ok(Some(user))
    }

    /// Mirror a freshly registered provider account into the store and
    /// return the new record.
    pub async fn create(&self, uid: &str, email: &str, nickname: &str) -> Result<User, StoreError> {
        let user = User {
            uid: uid.to_string(),
            nickname: nickname.to_string(),
            email: email.to_string(),
            last_login: now_rfc3339(),
            is_active: true,
            mystery_box_attempts: 0,
            role: UserRole::User,
        };

        self.store
            .put(&StorePath::record(paths::USERS, uid), encode_record(&user)?)
            .await?;
        Ok(user)
    }

    /// Stamp `last_login`; called on every session start.
    pub async fn record_login(&self, uid: &str) -> Result<(), StoreError> {
        let patch = UserPatch {
            last_login: Some(now_rfc3339()),
            ..Default::default()
        };
        self.update(uid, &patch).await
    }

    pub async fn update(&self, uid: &str, patch: &UserPatch) -> Result<(), StoreError> {
        self.store
            .update(&StorePath::record(paths::USERS, uid), encode_patch(patch)?)
            .await
    }

    /// Remove the database record only. The identity-provider account is
    /// managed elsewhere and survives this call.
    pub async fn delete(&self, uid: &str) -> Result<(), StoreError> {
        self.store
            .remove(&StorePath::record(paths::USERS, uid))
            .await
    }
}
