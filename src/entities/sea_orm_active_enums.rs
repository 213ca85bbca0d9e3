//! String-backed enums shared by the gift and quota tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a gift is claimed whole or split into quotas. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum GiftKind {
    /// Claimed as a single unit by one guest group
    #[sea_orm(string_value = "integral")]
    Integral,
    /// Divided into equal-value quotas claimable independently
    #[sea_orm(string_value = "fractional")]
    Fractional,
}

/// Availability of a gift as seen by guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum GiftStatus {
    /// Nothing claimed yet
    #[sea_orm(string_value = "available")]
    Available,
    /// Some, but not all, quotas are claimed (fractional only)
    #[sea_orm(string_value = "partially_selected")]
    PartiallySelected,
    /// Fully claimed
    #[sea_orm(string_value = "selected")]
    Selected,
}

/// Availability of a single quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum QuotaStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "selected")]
    Selected,
}

/// Kind of the polymorphic detail attached to a gift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    /// No extra detail
    #[sea_orm(string_value = "plain")]
    Plain,
    /// Bought from an external store; requires a store link
    #[sea_orm(string_value = "external_product")]
    ExternalProduct,
}
