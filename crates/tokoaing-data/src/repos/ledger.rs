use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use entity::{Keyed, PurchaseHistoryItem, PurchaseKind, PurchaseStatus};

use crate::error::StoreError;
use crate::store::{paths, RealtimeStore, StorePath};
use crate::util::{now_rfc3339, parse_rfc3339};

use super::{encode_record, Feed};

/// Name stamped on mystery-box ledger entries.
pub const MYSTERY_BOX_NAME: &str = "Mystery Box";

/// What a user is buying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewPurchase {
    /// A catalog item; `product_id` drives the stock decrement on approval.
    Product {
        product_name: String,
        product_id: String,
    },
    /// A mystery box; the prize is assigned by the admin on approval.
    MysteryBox { product_name: String },
}

impl NewPurchase {
    pub fn mystery_box() -> Self {
        Self::MysteryBox {
            product_name: MYSTERY_BOX_NAME.to_string(),
        }
    }
}

/// Admin verdict on a pending purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PurchaseDecision {
    /// Fulfil the purchase. For mystery boxes a non-empty `prize` is
    /// recorded on the entry.
    Approve { prize: Option<String> },
    Reject,
}

impl PurchaseDecision {
    fn status(&self) -> PurchaseStatus {
        match self {
            Self::Approve { .. } => PurchaseStatus::Success,
            Self::Reject => PurchaseStatus::Rejected,
        }
    }
}

/// The purchase ledger: pending entries created by users, decided by
/// admins, with the stock and attempt-counter side effects of the
/// storefront's fulfillment flow.
pub struct PurchaseLedger {
    store: Arc<dyn RealtimeStore>,
}

impl PurchaseLedger {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Record a new pending purchase and return its id.
    ///
    /// Mystery-box purchases also bump the user's attempt counter, win or
    /// lose, through the store's atomic transaction so concurrent buyers
    /// never lose an increment.
    pub async fn create(&self, user_id: &str, purchase: NewPurchase) -> Result<String, StoreError> {
        let (kind, product_name, product_id) = match purchase {
            NewPurchase::Product {
                product_name,
                product_id,
            } => (PurchaseKind::Product, product_name, Some(product_id)),
            NewPurchase::MysteryBox { product_name } => {
                (PurchaseKind::MysteryBox, product_name, None)
            }
        };

        if kind == PurchaseKind::MysteryBox {
            let counter = StorePath::record(paths::USERS, user_id).field("mysteryBoxAttempts");
            self.store
                .transaction_i64(&counter, &|attempts| attempts.unwrap_or(0) + 1)
                .await?;
        }

        let item = PurchaseHistoryItem {
            id: String::new(),
            user_id: user_id.to_string(),
            kind,
            product_name,
            timestamp: now_rfc3339(),
            status: PurchaseStatus::Pending,
            product_id,
            is_opened: None,
            prize: None,
        };

        let id = self
            .store
            .push(paths::PURCHASE_HISTORY, encode_record(&item)?)
            .await?;
        debug!(purchase = %id, user = user_id, ?kind, "created pending purchase");
        Ok(id)
    }

    /// Apply an admin decision to a pending purchase.
    ///
    /// A missing purchase id is a silent no-op, and so is a purchase that
    /// has already been decided: stock is never decremented twice and a
    /// prize is never overwritten. The pending check and the stock
    /// transaction are separate store operations, so a remote backend
    /// narrows rather than closes the double-approval window; `MemoryStore`
    /// serializes them fully.
    ///
    /// Approving a product purchase decrements the referenced product's
    /// stock by one, floored at zero.
    pub async fn decide(
        &self,
        purchase_id: &str,
        decision: PurchaseDecision,
    ) -> Result<(), StoreError> {
        let path = StorePath::record(paths::PURCHASE_HISTORY, purchase_id);
        let Some(value) = self.store.get(&path).await? else {
            debug!(purchase = purchase_id, "decision on missing purchase ignored");
            return Ok(());
        };

        let mut item: PurchaseHistoryItem =
            serde_json::from_value(value).map_err(StoreError::read)?;
        item.set_key(purchase_id);

        if item.status != PurchaseStatus::Pending {
            debug!(
                purchase = purchase_id,
                status = ?item.status,
                "purchase already decided, ignoring"
            );
            return Ok(());
        }

        let status = decision.status();
        let mut patch = Map::new();
        patch.insert(
            "status".to_string(),
            serde_json::to_value(status).map_err(StoreError::write)?,
        );

        if let PurchaseDecision::Approve { prize } = &decision {
            if item.kind == PurchaseKind::Product {
                if let Some(product_id) = &item.product_id {
                    let stock = StorePath::record(paths::PRODUCTS, product_id).field("stock");
                    self.store
                        .transaction_i64(&stock, &|stock| match stock {
                            Some(n) if n > 0 => n - 1,
                            _ => 0,
                        })
                        .await?;
                }
            }

            if item.kind == PurchaseKind::MysteryBox {
                if let Some(prize) = prize.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                    patch.insert("prize".to_string(), Value::String(prize.to_string()));
                }
            }
        }

        self.store.update(&path, patch).await?;
        debug!(purchase = purchase_id, ?status, "purchase decided");
        Ok(())
    }

    /// Flag a won mystery box as opened.
    ///
    /// Unconditional: no check that the entry is a mystery box or that it
    /// was approved. The storefront only offers the action on unopened
    /// wins, and repeating it just leaves the flag set.
    pub async fn open_mystery_box(&self, purchase_id: &str) -> Result<(), StoreError> {
        let mut patch = Map::new();
        patch.insert("isOpened".to_string(), Value::Bool(true));
        self.store
            .update(
                &StorePath::record(paths::PURCHASE_HISTORY, purchase_id),
                patch,
            )
            .await
    }

    /// Drop a ledger entry (a user cancelling a pending purchase or
    /// clearing a decided one).
    pub async fn delete(&self, purchase_id: &str) -> Result<(), StoreError> {
        self.store
            .remove(&StorePath::record(paths::PURCHASE_HISTORY, purchase_id))
            .await
    }

    /// Live ledger feed, newest first, optionally narrowed to one user.
    pub fn subscribe(&self, user_id: Option<&str>) -> Feed<PurchaseHistoryItem> {
        let filter = user_id.map(str::to_string);
        Feed::new(
            paths::PURCHASE_HISTORY,
            self.store.subscribe(paths::PURCHASE_HISTORY),
            Box::new(move |items: &mut Vec<PurchaseHistoryItem>| {
                if let Some(uid) = &filter {
                    items.retain(|item| item.user_id == *uid);
                }
                items.sort_by(|a, b| {
                    parse_rfc3339(&b.timestamp)
                        .cmp(&parse_rfc3339(&a.timestamp))
                        .then_with(|| b.id.cmp(&a.id))
                });
            }),
        )
    }
}
