//! Selection item entity - A confirmed line item of a selection.
//!
//! Gift id and name are a snapshot taken at claim time, so there is deliberately no
//! foreign key to `gifts`: the selection stays readable after the gift is edited or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Selection item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "selection_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning selection
    pub selection_id: Uuid,
    /// Order of the item within the claim request
    pub position: i32,
    pub gift_id: Uuid,
    /// Gift name at claim time
    pub gift_name: String,
    /// 1 for integral gifts, number of quotas for fractional gifts
    pub quantity: i32,
    /// Value of one quota in minor units, fractional gifts only
    pub unit_value_cents: Option<i64>,
}

/// Defines relationships between `SelectionItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one selection
    #[sea_orm(
        belongs_to = "super::selection::Entity",
        from = "Column::SelectionId",
        to = "super::selection::Column::Id",
        on_delete = "Cascade"
    )]
    Selection,
}

impl Related<super::selection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
