use serde::{Deserialize, Serialize};

use crate::Keyed;

/// Private message addressed to one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMessage {
    /// Record key; not part of the stored value.
    #[serde(default, skip_serializing)]
    pub id: String,

    /// Recipient.
    pub user_id: String,

    pub text: String,

    /// RFC 3339 send time.
    pub timestamp: String,

    pub is_read: bool,
}

impl Keyed for PrivateMessage {
    fn set_key(&mut self, key: &str) {
        self.id = key.to_string();
    }
}
