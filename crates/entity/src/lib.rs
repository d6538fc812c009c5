pub mod custom_button;
pub mod leaderboard;
pub mod private_message;
pub mod product;
pub mod purchase;
pub mod review;
pub mod user;

pub use custom_button::{CustomButton, CustomButtonPatch};
pub use leaderboard::LeaderboardEntry;
pub use private_message::PrivateMessage;
pub use product::{Product, ProductPatch};
pub use purchase::{PurchaseHistoryItem, PurchaseKind, PurchaseStatus};
pub use review::{Review, ReviewPatch};
pub use user::{User, UserPatch, UserRole};

/// Implemented by every stored record type.
///
/// Records live in the store without their own key; the key is the child
/// name under the collection. Decoders call `set_key` to stamp it back into
/// the typed value.
pub trait Keyed {
    fn set_key(&mut self, key: &str);
}
