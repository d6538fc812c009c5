use std::collections::HashMap;
use std::sync::Arc;

use entity::{LeaderboardEntry, PurchaseHistoryItem, PurchaseKind, PurchaseStatus, User};

use crate::store::{paths, RealtimeStore, StoreWatch};
use crate::util::parse_rfc3339;

use super::decode_records;

/// Compute the mystery-box leaderboard from the full user set and ledger.
///
/// Qualifying entries are approved mystery boxes with a non-empty prize.
/// The ledger is walked in `(timestamp, id)` ascending order; users are
/// ranked by win count descending, ties broken by whose first win came
/// earlier. Users missing from the identity set are skipped, and an empty
/// ledger yields an empty board.
pub fn compute_leaderboard(
    users: &[User],
    ledger: &[PurchaseHistoryItem],
) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&PurchaseHistoryItem> = ledger.iter().collect();
    ordered.sort_by(|a, b| {
        parse_rfc3339(&a.timestamp)
            .cmp(&parse_rfc3339(&b.timestamp))
            .then_with(|| a.id.cmp(&b.id))
    });

    // Wins per user, keyed in first-win order.
    let mut first_win_order: Vec<&str> = Vec::new();
    let mut wins: HashMap<&str, Vec<String>> = HashMap::new();
    for item in ordered {
        if item.kind != PurchaseKind::MysteryBox || item.status != PurchaseStatus::Success {
            continue;
        }
        let Some(prize) = item.prize.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            continue;
        };
        if !wins.contains_key(item.user_id.as_str()) {
            first_win_order.push(&item.user_id);
        }
        wins.entry(&item.user_id).or_default().push(prize.to_string());
    }

    let users_by_uid: HashMap<&str, &User> = users.iter().map(|u| (u.uid.as_str(), u)).collect();

    let mut entries: Vec<LeaderboardEntry> = first_win_order
        .into_iter()
        .filter_map(|uid| {
            let user = users_by_uid.get(uid)?;
            let obtained = wins.remove(uid)?;
            Some(LeaderboardEntry {
                rank: 0,
                uid: user.uid.clone(),
                nickname: user.nickname.clone(),
                email: user.email.clone(),
                last_login: user.last_login.clone(),
                items_obtained: obtained.len(),
                obtained_items: obtained,
            })
        })
        .collect();

    // Stable, so equal counts keep first-win order.
    entries.sort_by(|a, b| b.items_obtained.cmp(&a.items_obtained));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

/// Derived leaderboard view.
pub struct Leaderboard {
    store: Arc<dyn RealtimeStore>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Live board, recomputed in full whenever the user set or the ledger
    /// changes.
    pub fn subscribe(&self) -> LeaderboardFeed {
        LeaderboardFeed {
            users: self.store.subscribe(paths::USERS),
            ledger: self.store.subscribe(paths::PURCHASE_HISTORY),
            delivered_initial: false,
        }
    }
}

/// Joined feed over `users` and `purchaseHistory`. Dropping it releases
/// both underlying subscriptions.
pub struct LeaderboardFeed {
    users: StoreWatch,
    ledger: StoreWatch,
    delivered_initial: bool,
}

impl LeaderboardFeed {
    fn compute(&self) -> Vec<LeaderboardEntry> {
        let users: Vec<User> = decode_records(paths::USERS, &self.users.current());
        let ledger: Vec<PurchaseHistoryItem> =
            decode_records(paths::PURCHASE_HISTORY, &self.ledger.current());
        compute_leaderboard(&users, &ledger)
    }

    /// Latest board without waiting.
    pub fn current(&self) -> Vec<LeaderboardEntry> {
        self.compute()
    }

    /// Next board: the current one on first call, then one per change to
    /// either source. `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<Vec<LeaderboardEntry>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some(self.compute());
        }

        tokio::select! {
            changed = self.users.changed() => changed.ok()?,
            changed = self.ledger.changed() => changed.ok()?,
        }
        Some(self.compute())
    }
}
