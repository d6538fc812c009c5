use serde::{Deserialize, Serialize};

use crate::Keyed;

/// Shop review, independent of the purchase flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Record key; not part of the stored value.
    #[serde(default, skip_serializing)]
    pub id: String,

    pub author: String,
    pub text: String,

    /// RFC 3339 creation time.
    pub created_at: String,
}

impl Keyed for Review {
    fn set_key(&mut self, key: &str) {
        self.id = key.to_string();
    }
}

/// Partial update for a review; only present fields are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
