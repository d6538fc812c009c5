use serde::{Deserialize, Serialize};

use crate::Keyed;

/// Stored role marker.
///
/// Every persisted account is a regular user. Admin access is a short-lived
/// session credential, never a stored role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
}

/// Shop account, keyed by the identity-provider subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Record key (the auth subject); not part of the stored value.
    #[serde(default, skip_serializing)]
    pub uid: String,

    pub nickname: String,
    pub email: String,

    /// RFC 3339, refreshed on every session start.
    pub last_login: String,

    pub is_active: bool,

    /// Count of mystery-box purchases made, independent of outcome.
    #[serde(default)]
    pub mystery_box_attempts: i64,

    #[serde(default)]
    pub role: UserRole,
}

impl Keyed for User {
    fn set_key(&mut self, key: &str) {
        self.uid = key.to_string();
    }
}

/// Partial update for a user record; only present fields are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
