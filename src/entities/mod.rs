//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod gift;
pub mod quota;
pub mod sea_orm_active_enums;
pub mod selection;
pub mod selection_item;

// Re-export specific types to avoid conflicts
pub use gift::{Column as GiftColumn, Entity as Gift, Model as GiftModel};
pub use quota::{Column as QuotaColumn, Entity as Quota, Model as QuotaModel};
pub use sea_orm_active_enums::{DetailKind, GiftKind, GiftStatus, QuotaStatus};
pub use selection::{Column as SelectionColumn, Entity as Selection, Model as SelectionModel};
pub use selection_item::{
    Column as SelectionItemColumn, Entity as SelectionItem, Model as SelectionItemModel,
};
