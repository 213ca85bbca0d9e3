//! Gift aggregate.
//!
//! A gift is either claimed whole ([`GiftShares::Whole`]) or split into quotas
//! ([`GiftShares::Split`]). The reservation engine branches on the variant explicitly.
//! For split gifts the status is recomputed from the quota set after every mutation
//! and never set independently.

use super::{money, quota::Quota};
use crate::{
    entities::{DetailKind, GiftKind, GiftStatus},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Polymorphic detail attached to a gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftDetails {
    pub kind: DetailKind,
    pub store_link: Option<String>,
}

impl GiftDetails {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            kind: DetailKind::Plain,
            store_link: None,
        }
    }

    #[must_use]
    pub fn external_product(store_link: impl Into<String>) -> Self {
        Self {
            kind: DetailKind::ExternalProduct,
            store_link: Some(store_link.into()),
        }
    }
}

/// Owner-editable attributes of a gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftAttributes {
    pub name: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub is_favorite: bool,
    pub category: String,
    pub details: GiftDetails,
}

impl GiftAttributes {
    /// Creates attributes with the given name and empty optional fields.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            photo_url: None,
            is_favorite: false,
            category: String::new(),
            details: GiftDetails::plain(),
        }
    }

    /// Checks the name is present and that an external product carries its store link.
    /// Returns the attributes with the name trimmed.
    pub fn validated(mut self) -> Result<Self> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidGiftDetails {
                reason: "Gift name cannot be empty".to_string(),
            });
        }
        self.name = trimmed.to_string();

        if self.details.kind == DetailKind::ExternalProduct
            && self
                .details
                .store_link
                .as_deref()
                .is_none_or(|link| link.trim().is_empty())
        {
            return Err(Error::InvalidGiftDetails {
                reason: "An external product needs a store link".to_string(),
            });
        }
        Ok(self)
    }
}

/// Kind-specific payload of a gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GiftShares {
    /// Integral gift, with the claiming selection once taken
    #[serde(rename_all = "camelCase")]
    Whole { selection_id: Option<Uuid> },
    /// Fractional gift and its quotas in ordinal order
    #[serde(rename_all = "camelCase")]
    Split {
        total_value: Decimal,
        quotas: Vec<Quota>,
    },
}

/// Derives a split gift's status from its quotas.
#[must_use]
pub fn derive_status(quotas: &[Quota]) -> GiftStatus {
    let selected = quotas.iter().filter(|q| !q.is_available()).count();
    if selected == 0 {
        GiftStatus::Available
    } else if selected == quotas.len() {
        GiftStatus::Selected
    } else {
        GiftStatus::PartiallySelected
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(flatten)]
    pub attributes: GiftAttributes,
    status: GiftStatus,
    shares: GiftShares,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gift {
    /// Creates an available integral gift.
    pub fn new_integral(event_id: Uuid, attributes: GiftAttributes) -> Result<Self> {
        let attributes = attributes.validated()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            event_id,
            attributes,
            status: GiftStatus::Available,
            shares: GiftShares::Whole { selection_id: None },
            created_at: now,
            updated_at: now,
        })
    }

    /// Creates an available fractional gift with `quota_count` quotas numbered from 1,
    /// each worth `round(total_value / quota_count, 2)`. The total itself is rounded
    /// to cents, the precision it is stored with.
    pub fn new_fractional(
        event_id: Uuid,
        attributes: GiftAttributes,
        requested_total: Decimal,
        quota_count: u32,
    ) -> Result<Self> {
        let attributes = attributes.validated()?;
        let total_value = money::round_cents(requested_total);
        if total_value <= Decimal::ZERO {
            return Err(Error::InvalidTotalValue {
                value: requested_total,
            });
        }
        if quota_count <= 1 {
            return Err(Error::InvalidQuotaCount { count: quota_count });
        }
        let value = money::quota_value(total_value, quota_count)
            .filter(|v| *v > Decimal::ZERO)
            .ok_or(Error::InvalidTotalValue {
                value: requested_total,
            })?;

        let id = Uuid::new_v4();
        let quotas = (1..=quota_count)
            .map(|ordinal| Quota::new(id, ordinal, value))
            .collect();
        let now = Utc::now();
        Ok(Self {
            id,
            event_id,
            attributes,
            status: GiftStatus::Available,
            shares: GiftShares::Split {
                total_value,
                quotas,
            },
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a gift from stored state. Split gifts get their status re-derived from
    /// `quotas`, which are sorted by ordinal.
    #[must_use]
    pub fn restore(
        id: Uuid,
        event_id: Uuid,
        attributes: GiftAttributes,
        status: GiftStatus,
        mut shares: GiftShares,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let status = match &mut shares {
            GiftShares::Whole { .. } => status,
            GiftShares::Split { quotas, .. } => {
                quotas.sort_by_key(|q| q.ordinal);
                derive_status(quotas)
            }
        };
        Self {
            id,
            event_id,
            attributes,
            status,
            shares,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    pub const fn status(&self) -> GiftStatus {
        self.status
    }

    #[must_use]
    pub const fn shares(&self) -> &GiftShares {
        &self.shares
    }

    #[must_use]
    pub const fn kind(&self) -> GiftKind {
        match self.shares {
            GiftShares::Whole { .. } => GiftKind::Integral,
            GiftShares::Split { .. } => GiftKind::Fractional,
        }
    }

    /// Quotas in ordinal order; empty for integral gifts.
    #[must_use]
    pub fn quotas(&self) -> &[Quota] {
        match &self.shares {
            GiftShares::Whole { .. } => &[],
            GiftShares::Split { quotas, .. } => quotas,
        }
    }

    #[must_use]
    pub const fn total_value(&self) -> Option<Decimal> {
        match &self.shares {
            GiftShares::Whole { .. } => None,
            GiftShares::Split { total_value, .. } => Some(*total_value),
        }
    }

    /// Value of one quota; `None` for integral gifts.
    #[must_use]
    pub fn quota_value(&self) -> Option<Decimal> {
        self.quotas().first().map(|q| q.value)
    }

    #[must_use]
    pub fn available_quota_count(&self) -> u32 {
        count_u32(self.quotas().iter().filter(|q| q.is_available()).count())
    }

    /// Number of claimed units: selected quotas, or 1 for a taken integral gift.
    #[must_use]
    pub fn selected_count(&self) -> u32 {
        match &self.shares {
            GiftShares::Whole { selection_id } => u32::from(selection_id.is_some()),
            GiftShares::Split { quotas, .. } => {
                count_u32(quotas.iter().filter(|q| !q.is_available()).count())
            }
        }
    }

    /// Whether any portion of the gift is claimed.
    #[must_use]
    pub fn has_claims(&self) -> bool {
        self.status != GiftStatus::Available || self.selected_count() > 0
    }

    /// Claims an integral gift for `selection_id`.
    ///
    /// Returns `false` without changing anything when the gift is already taken or is
    /// not integral; the caller reports that as a conflict.
    pub fn claim_whole(&mut self, selection_id: Uuid) -> bool {
        match &mut self.shares {
            GiftShares::Whole { selection_id: owner } if self.status == GiftStatus::Available => {
                *owner = Some(selection_id);
                self.status = GiftStatus::Selected;
                true
            }
            _ => false,
        }
    }

    /// Claims the `requested` lowest-ordinal available quotas for `selection_id` and
    /// re-derives the status. Returns the ids of the quotas taken.
    ///
    /// Nothing changes when fewer than `requested` quotas are available.
    pub fn claim_quotas(&mut self, requested: u32, selection_id: Uuid) -> Result<Vec<Uuid>> {
        let available = self.available_quota_count();
        let GiftShares::Split { quotas, .. } = &mut self.shares else {
            return Err(Error::InvalidQuantity {
                gift_id: self.id,
                quantity: requested,
            });
        };
        if requested == 0 {
            return Err(Error::InvalidQuantity {
                gift_id: self.id,
                quantity: requested,
            });
        }
        if available < requested {
            return Err(Error::InsufficientQuotas {
                gift_id: self.id,
                requested,
                available,
            });
        }

        let taken: Vec<Uuid> = quotas
            .iter_mut()
            .filter(|q| q.is_available())
            .take(requested as usize)
            .filter_map(|q| q.select(selection_id).then_some(q.id))
            .collect();
        self.status = derive_status(quotas);
        Ok(taken)
    }

    /// Releases every portion held by `selection_id` and re-derives the status.
    /// Returns the number of units released.
    pub fn release(&mut self, selection_id: Uuid) -> u32 {
        match &mut self.shares {
            GiftShares::Whole { selection_id: owner } => {
                if *owner == Some(selection_id) {
                    *owner = None;
                    self.status = GiftStatus::Available;
                    1
                } else {
                    0
                }
            }
            GiftShares::Split { quotas, .. } => {
                let released = quotas
                    .iter_mut()
                    .filter(|q| q.selection_id() == Some(selection_id))
                    .map(Quota::release)
                    .filter(|released| *released)
                    .count();
                self.status = derive_status(quotas);
                count_u32(released)
            }
        }
    }

    /// Replaces the owner-editable attributes. Kind and status are untouched.
    pub fn update_attributes(&mut self, attributes: GiftAttributes) -> Result<()> {
        self.attributes = attributes.validated()?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
