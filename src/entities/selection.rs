//! Selection entity - The immutable record of one successful claim by a guest group.
//!
//! Rows are inserted once by the reservation engine and never updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Selection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "selections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Event every claimed gift belongs to
    pub event_id: Uuid,
    /// Guest group that made the claim
    pub guest_group_id: Uuid,
    /// When the claim was committed
    pub selected_at: DateTimeUtc,
}

/// Defines relationships between Selection and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One selection has many confirmed line items
    #[sea_orm(has_many = "super::selection_item::Entity")]
    Items,
}

impl Related<super::selection_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
