//! Gift entity - One claimable item on an event's registry.
//!
//! `status` is owned by the reservation engine. For fractional gifts it always mirrors the
//! state of the gift's quotas; for integral gifts it is the only record of the claim.

use super::sea_orm_active_enums::{DetailKind, GiftKind, GiftStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gift database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gifts")]
pub struct Model {
    /// Unique identifier for the gift
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Event this gift is listed on
    pub event_id: Uuid,
    /// Display name (never empty)
    pub name: String,
    pub description: String,
    pub photo_url: Option<String>,
    /// Favorites are listed first
    pub is_favorite: bool,
    pub category: String,
    /// Kind of the detail payload
    pub detail_kind: DetailKind,
    /// External store link, required when `detail_kind` is `external_product`
    pub store_link: Option<String>,
    /// Integral or fractional, fixed at creation
    pub kind: GiftKind,
    /// Current availability
    pub status: GiftStatus,
    /// Total value in minor units, fractional gifts only
    pub total_value_cents: Option<i64>,
    /// Claiming selection of an integral gift; always `None` for fractional gifts
    pub selection_id: Option<Uuid>,
    /// When the gift was created
    pub created_at: DateTimeUtc,
    /// When the gift was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Gift and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A fractional gift owns its quotas
    #[sea_orm(has_many = "super::quota::Entity")]
    Quotas,
}

impl Related<super::quota::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
