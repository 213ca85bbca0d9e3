//! Domain model - gifts, quotas and selections as plain Rust values.
//!
//! Nothing in here touches the database. The reservation engine loads rows, hydrates
//! these types, applies the state transitions defined here and writes the result back
//! inside one transaction.

pub mod gift;
pub mod money;
pub mod quota;
pub mod selection;

pub use gift::{Gift, GiftAttributes, GiftDetails, GiftShares, derive_status};
pub use quota::Quota;
pub use selection::{ConfirmedItem, Selection};
