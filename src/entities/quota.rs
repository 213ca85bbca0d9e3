//! Quota entity - One equal-value share of a fractional gift.
//!
//! `selection_id` is a weak back-pointer to the claiming selection: it is set iff
//! `status` is `selected` and carries no foreign key.

use super::sea_orm_active_enums::QuotaStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Quota database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning gift
    pub gift_id: Uuid,
    /// Position 1..N, defines allocation order
    pub ordinal: i32,
    /// Value of this share in minor units
    pub value_cents: i64,
    pub status: QuotaStatus,
    pub selection_id: Option<Uuid>,
}

/// Defines relationships between Quota and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each quota belongs to one gift and is removed with it
    #[sea_orm(
        belongs_to = "super::gift::Entity",
        from = "Column::GiftId",
        to = "super::gift::Column::Id",
        on_delete = "Cascade"
    )]
    Gift,
}

impl Related<super::gift::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gift.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
