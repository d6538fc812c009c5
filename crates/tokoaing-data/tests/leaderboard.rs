use std::sync::Arc;

use entity::{PurchaseHistoryItem, PurchaseKind, PurchaseStatus, User, UserRole};
use tokoaing_data::{
    compute_leaderboard, IdentityRepository, Leaderboard, MemoryStore, NewPurchase,
    PurchaseDecision, PurchaseLedger, RealtimeStore,
};

fn user(uid: &str) -> User {
    User {
        uid: uid.to_string(),
        nickname: format!("{uid}-nick"),
        email: format!("{uid}@example.com"),
        last_login: "2026-08-08T00:00:00.000Z".to_string(),
        is_active: true,
        mystery_box_attempts: 0,
        role: UserRole::User,
    }
}

fn win(id: &str, uid: &str, minute: u32, prize: &str) -> PurchaseHistoryItem {
    PurchaseHistoryItem {
        id: id.to_string(),
        user_id: uid.to_string(),
        kind: PurchaseKind::MysteryBox,
        product_name: "Mystery Box".to_string(),
        timestamp: format!("2026-08-08T10:{minute:02}:00.000Z"),
        status: PurchaseStatus::Success,
        product_id: None,
        is_opened: None,
        prize: Some(prize.to_string()),
    }
}

#[test]
fn empty_ledger_yields_an_empty_board() {
    let users = vec![user("u1")];
    assert!(compute_leaderboard(&users, &[]).is_empty());
}

#[test]
fn a_single_win_yields_a_single_ranked_entry() {
    let users = vec![user("u1")];
    let ledger = vec![win("p1", "u1", 0, "Hat")];

    let board = compute_leaderboard(&users, &ledger);
    assert_eq!(board.len(), 1);
    let entry = &board[0];
    assert_eq!(entry.uid, "u1");
    assert_eq!(entry.items_obtained, 1);
    assert_eq!(entry.obtained_items, vec!["Hat".to_string()]);
    assert_eq!(entry.rank, 1);
}

#[test]
fn only_rewarded_mystery_box_successes_count() {
    let users = vec![user("u1")];
    let mut pending = win("p1", "u1", 0, "Hat");
    pending.status = PurchaseStatus::Pending;
    let mut rejected = win("p2", "u1", 1, "Hat");
    rejected.status = PurchaseStatus::Rejected;
    let mut prizeless = win("p3", "u1", 2, "Hat");
    prizeless.prize = None;
    let mut blank = win("p4", "u1", 3, "Hat");
    blank.prize = Some("  ".to_string());
    let mut product = win("p5", "u1", 4, "Hat");
    product.kind = PurchaseKind::Product;

    let board = compute_leaderboard(&users, &[pending, rejected, prizeless, blank, product]);
    assert!(board.is_empty());
}

#[test]
fn ties_keep_first_win_order() {
    let users = vec![user("a"), user("b"), user("c")];
    // A's wins land first in the ledger, then B's single win, then C's.
    let ledger = vec![
        win("p1", "a", 0, "Hat"),
        win("p2", "a", 1, "Scarf"),
        win("p3", "a", 2, "Pin"),
        win("p4", "b", 3, "Mug"),
        win("p5", "c", 4, "Hat"),
        win("p6", "c", 5, "Scarf"),
        win("p7", "c", 6, "Pin"),
    ];

    let board = compute_leaderboard(&users, &ledger);
    let ranked: Vec<(&str, usize, usize)> = board
        .iter()
        .map(|e| (e.uid.as_str(), e.items_obtained, e.rank))
        .collect();
    assert_eq!(ranked, vec![("a", 3, 1), ("c", 3, 2), ("b", 1, 3)]);
}

#[test]
fn ledger_order_is_timestamp_then_id_not_input_order() {
    let users = vec![user("u1")];
    // Input order scrambled; prizes must come out in chronological order.
    let ledger = vec![
        win("p3", "u1", 2, "Pin"),
        win("p1", "u1", 0, "Hat"),
        win("p2", "u1", 1, "Scarf"),
    ];

    let board = compute_leaderboard(&users, &ledger);
    assert_eq!(
        board[0].obtained_items,
        vec!["Hat".to_string(), "Scarf".to_string(), "Pin".to_string()]
    );
}

#[test]
fn wins_of_deleted_users_are_skipped() {
    let users = vec![user("a")];
    let ledger = vec![win("p1", "a", 0, "Hat"), win("p2", "ghost", 1, "Mug")];

    let board = compute_leaderboard(&users, &ledger);
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].uid, "a");
}

#[tokio::test]
async fn the_live_board_recomputes_on_ledger_and_user_changes() {
    let store: Arc<dyn RealtimeStore> = Arc::new(MemoryStore::new());
    let identity = IdentityRepository::new(store.clone());
    let ledger = PurchaseLedger::new(store.clone());
    let leaderboard = Leaderboard::new(store.clone());

    let mut feed = leaderboard.subscribe();
    assert!(feed.next().await.unwrap().is_empty(), "initial board");

    identity.create("u1", "u1@example.com", "aing").await.unwrap();
    assert!(feed.next().await.unwrap().is_empty(), "no wins yet");

    let box_id = ledger
        .create("u1", NewPurchase::mystery_box())
        .await
        .unwrap();
    ledger
        .decide(
            &box_id,
            PurchaseDecision::Approve {
                prize: Some("Hat".to_string()),
            },
        )
        .await
        .unwrap();

    // Drain deliveries until the win shows up; the counter transaction and
    // the push are separate changes.
    let mut board = feed.next().await.unwrap();
    while board.is_empty() {
        board = feed.next().await.unwrap();
    }
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].uid, "u1");
    assert_eq!(board[0].nickname, "u1-nick");
    assert_eq!(board[0].obtained_items, vec!["Hat".to_string()]);

    // Deleting the user empties the board on the next recompute.
    identity.delete("u1").await.unwrap();
    let board = feed.next().await.unwrap();
    assert!(board.is_empty());
}
