//! Data layer for the TOKOaing storefront.
//!
//! Everything the storefront and its admin panel persist lives in an
//! external realtime key-value store; this crate provides the typed
//! repositories over it, the purchase-fulfillment flow, the derived
//! mystery-box leaderboard, and the server-validated admin session. The
//! store itself is injected as a [`RealtimeStore`] handle; [`MemoryStore`]
//! is the reference backend.

pub mod admin;
pub mod crypto;
pub mod env;
pub mod error;
pub mod jwt;
pub mod repos;
pub mod store;
pub mod util;

pub use admin::{AdminClaims, AdminConfig, AdminSessions};
pub use error::{AuthError, StoreError};
pub use repos::{
    compute_leaderboard, ButtonsRepository, CatalogRepository, Feed, IdentityRepository,
    Leaderboard, LeaderboardFeed, MessagingRepository, NewPurchase, PurchaseDecision,
    PurchaseLedger, ReviewsRepository, ANNOUNCEMENT_PREFIX, MYSTERY_BOX_NAME,
};
pub use store::{paths, MemoryStore, RealtimeStore, StorePath, StoreWatch};
