use serde::{Deserialize, Serialize};

use crate::Keyed;

/// Catalog item.
///
/// `stock` only ever decreases, and only through purchase approval; restock
/// happens by an admin editing the field directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Record key; not part of the stored value.
    #[serde(default, skip_serializing)]
    pub id: String,

    pub name: String,

    /// Integer currency units.
    pub price: i64,

    /// Current sellable count.
    pub stock: i64,

    /// Count at creation, used to render a sold-percentage bar.
    pub max_stock: i64,

    pub is_active: bool,

    pub category: String,
    pub description: String,
    pub image_url: String,
    pub buy_link: String,
}

impl Keyed for Product {
    fn set_key(&mut self, key: &str) {
        self.id = key.to_string();
    }
}

/// Partial update for a product; only present fields are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_link: Option<String>,
}
