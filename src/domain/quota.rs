//! A quota is one equal-value share of a fractional gift.

use crate::entities::QuotaStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    pub id: Uuid,
    pub gift_id: Uuid,
    /// 1-based position; lower ordinals are allocated first
    pub ordinal: u32,
    pub value: Decimal,
    status: QuotaStatus,
    selection_id: Option<Uuid>,
}

impl Quota {
    /// Creates an available quota.
    #[must_use]
    pub fn new(gift_id: Uuid, ordinal: u32, value: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            gift_id,
            ordinal,
            value,
            status: QuotaStatus::Available,
            selection_id: None,
        }
    }

    /// Rebuilds a quota from stored state. A selected quota without an owning
    /// selection (or the reverse) is normalised to the state its `selection_id` implies.
    #[must_use]
    pub fn restore(
        id: Uuid,
        gift_id: Uuid,
        ordinal: u32,
        value: Decimal,
        selection_id: Option<Uuid>,
    ) -> Self {
        let status = if selection_id.is_some() {
            QuotaStatus::Selected
        } else {
            QuotaStatus::Available
        };
        Self {
            id,
            gift_id,
            ordinal,
            value,
            status,
            selection_id,
        }
    }

    #[must_use]
    pub const fn status(&self) -> QuotaStatus {
        self.status
    }

    #[must_use]
    pub const fn selection_id(&self) -> Option<Uuid> {
        self.selection_id
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == QuotaStatus::Available
    }

    /// Marks the quota as taken by `selection_id`. Returns `false` if it was already taken.
    pub fn select(&mut self, selection_id: Uuid) -> bool {
        if !self.is_available() {
            return false;
        }
        self.status = QuotaStatus::Selected;
        self.selection_id = Some(selection_id);
        true
    }

    /// Makes the quota available again. Returns `false` if it was not taken.
    pub fn release(&mut self) -> bool {
        if self.is_available() {
            return false;
        }
        self.status = QuotaStatus::Available;
        self.selection_id = None;
        true
    }
}
