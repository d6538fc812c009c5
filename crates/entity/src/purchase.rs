use serde::{Deserialize, Serialize};

use crate::Keyed;

/// What was bought.
///
/// Serialized under the `type` key in the stored record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseKind {
    Product,
    #[serde(rename = "mysterybox")]
    MysteryBox,
}

/// Fulfillment state.
///
/// Transitions are pending -> success or pending -> rejected, never back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Success,
    Rejected,
}

/// One entry in the purchase ledger.
///
/// `product_name` is a denormalized snapshot of the item name at purchase
/// time; it survives later catalog edits and deletions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseHistoryItem {
    /// Record key; not part of the stored value.
    #[serde(default, skip_serializing)]
    pub id: String,

    /// Owning user.
    pub user_id: String,

    #[serde(rename = "type")]
    pub kind: PurchaseKind,

    pub product_name: String,

    /// RFC 3339 creation time.
    pub timestamp: String,

    pub status: PurchaseStatus,

    /// Catalog reference, only for product purchases; drives the stock
    /// decrement on approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    /// Only meaningful for approved mystery boxes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_opened: Option<bool>,

    /// Assigned at most once, during approval of a mystery box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize: Option<String>,
}

impl Keyed for PurchaseHistoryItem {
    fn set_key(&mut self, key: &str) {
        self.id = key.to_string();
    }
}
