use serde::{Deserialize, Serialize};

use crate::Keyed;

/// Configurable link button shown in the storefront; no lifecycle coupling
/// to any other entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomButton {
    /// Record key; not part of the stored value.
    #[serde(default, skip_serializing)]
    pub id: String,

    pub name: String,
    pub url: String,
    pub icon: String,
    pub is_active: bool,
}

impl Keyed for CustomButton {
    fn set_key(&mut self, key: &str) {
        self.id = key.to_string();
    }
}

/// Partial update for a custom button; only present fields are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomButtonPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
