use serde::{Deserialize, Serialize};

/// One ranked row of the mystery-box leaderboard.
///
/// Fully derived from the user set and the purchase ledger; never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position after sorting.
    pub rank: usize,

    pub uid: String,
    pub nickname: String,
    pub email: String,
    pub last_login: String,

    /// Total mystery-box wins with an assigned prize.
    pub items_obtained: usize,

    /// Prize names in ledger order.
    pub obtained_items: Vec<String>,
}
