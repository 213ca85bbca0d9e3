//! Reservation coordinator - turns a guest group's claim into one atomic state change.
//!
//! Every claim runs in a single database transaction:
//!
//! 1. the requested gift rows are loaded with an exclusive row lock (ascending id);
//! 2. integral gifts that are already taken are collected as conflicts, everything else
//!    is mutated: integral gifts become selected, fractional gifts hand out their
//!    lowest-ordinal available quotas (their quota rows are locked first);
//! 3. any conflict rolls the whole transaction back and is reported as data;
//! 4. otherwise one selection row with all confirmed line items is inserted and the
//!    transaction commits.
//!
//! Unknown gifts, bad quantities and insufficient quotas abort the transaction with an
//! error, so no row changes. The row locks are the only serialization point: claims on
//! disjoint gifts run fully in parallel, claims on the same gift queue behind each other.
//! No gift or quota state is cached between calls.

use crate::{
    config::reservation::ReservationSettings,
    core::{gifts, selections},
    domain::{ConfirmedItem, Selection},
    entities::{GiftKind, QuotaStatus, gift},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// One requested gift and how many units (quotas, or 1 for an integral gift) to claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimItem {
    pub gift_id: Uuid,
    pub quantity: u32,
}

impl ClaimItem {
    #[must_use]
    pub const fn new(gift_id: Uuid, quantity: u32) -> Self {
        Self { gift_id, quantity }
    }
}

/// Result of a claim that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ClaimOutcome {
    /// Everything was claimed and the selection is committed
    Confirmed(Selection),
    /// Some integral gifts were already taken; nothing was changed
    Conflict {
        #[serde(rename = "conflictingGiftIds")]
        conflicting_gift_ids: Vec<Uuid>,
    },
}

impl ClaimOutcome {
    /// The committed selection, if the claim went through.
    #[must_use]
    pub const fn selection(&self) -> Option<&Selection> {
        match self {
            Self::Confirmed(selection) => Some(selection),
            Self::Conflict { .. } => None,
        }
    }
}

/// Rejects empty claims, zero quantities and repeated gifts before any transaction opens.
pub fn validate_claim(items: &[ClaimItem]) -> Result<()> {
    if items.is_empty() {
        return Err(Error::EmptyClaim);
    }
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            return Err(Error::InvalidQuantity {
                gift_id: item.gift_id,
                quantity: item.quantity,
            });
        }
        if !seen.insert(item.gift_id) {
            return Err(Error::DuplicateGift {
                gift_id: item.gift_id,
            });
        }
    }
    Ok(())
}

/// Opens a transaction and applies the configured lock-wait timeout to it.
///
/// `SQLite` has no row locks or per-transaction lock timeout; there the transaction
/// itself serializes writers.
async fn begin_locking(
    db: &DatabaseConnection,
    settings: &ReservationSettings,
) -> Result<DatabaseTransaction> {
    let txn = db.begin().await.map_err(Error::from_locking)?;
    if txn.get_database_backend() == DatabaseBackend::Postgres {
        txn.execute_unprepared(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            settings.lock_timeout.as_millis()
        ))
        .await?;
    }
    Ok(txn)
}

/// Claims `items` for `guest_group_id` in one transaction.
///
/// # Errors
/// - `EmptyClaim`, `InvalidQuantity`, `DuplicateGift` before the transaction opens
/// - `UnknownGift` (listing every unresolved id), `CrossEventClaim`, `InvalidQuantity`
///   for an integral gift requested more than once, and `InsufficientQuotas`; the
///   transaction is rolled back
/// - `LockTimeout` when a competing transaction holds the rows for too long; safe to retry
#[instrument(skip(db, settings, items), fields(items = items.len()))]
pub async fn claim_gifts(
    db: &DatabaseConnection,
    settings: &ReservationSettings,
    guest_group_id: Uuid,
    items: &[ClaimItem],
) -> Result<ClaimOutcome> {
    validate_claim(items)?;

    let txn = begin_locking(db, settings).await?;
    let outcome = apply_claim(&txn, guest_group_id, items)
        .await
        .map_err(Error::into_locking)?;

    match outcome {
        ClaimOutcome::Conflict {
            ref conflicting_gift_ids,
        } => {
            txn.rollback().await?;
            warn!(
                conflicts = conflicting_gift_ids.len(),
                "Claim rejected: gifts already taken"
            );
        }
        ClaimOutcome::Confirmed(ref selection) => {
            txn.commit().await.map_err(Error::from_locking)?;
            info!(
                selection_id = %selection.id,
                event_id = %selection.event_id,
                total_value = %selection.total_value(),
                "Claim committed"
            );
        }
    }
    Ok(outcome)
}

async fn apply_claim(
    txn: &DatabaseTransaction,
    guest_group_id: Uuid,
    items: &[ClaimItem],
) -> Result<ClaimOutcome> {
    let gift_ids: Vec<Uuid> = items.iter().map(|item| item.gift_id).collect();
    debug!(gifts = gift_ids.len(), "Locking requested gifts");
    let mut rows: HashMap<Uuid, gift::Model> = gifts::lock_gifts(txn, &gift_ids)
        .await?
        .into_iter()
        .map(|row| (row.id, row))
        .collect();

    let unknown: Vec<Uuid> = gift_ids
        .iter()
        .filter(|id| !rows.contains_key(id))
        .copied()
        .collect();
    if !unknown.is_empty() {
        warn!(unknown = unknown.len(), "Claim references unknown gifts");
        return Err(Error::UnknownGift { gift_ids: unknown });
    }

    let event_id = single_event(rows.values())?;
    let selection_id = Uuid::new_v4();
    let mut conflicts = Vec::new();
    let mut confirmed = Vec::with_capacity(items.len());

    for item in items {
        let Some(row) = rows.remove(&item.gift_id) else {
            continue;
        };
        match row.kind {
            GiftKind::Integral => {
                if item.quantity != 1 {
                    return Err(Error::InvalidQuantity {
                        gift_id: item.gift_id,
                        quantity: item.quantity,
                    });
                }
                let mut gift = gifts::to_domain(row, Vec::new())?;
                if !gift.claim_whole(selection_id) {
                    conflicts.push(gift.id);
                    continue;
                }
                gifts::write_gift_state(txn, &gift).await?;
                confirmed.push(ConfirmedItem {
                    gift_id: gift.id,
                    gift_name: gift.attributes.name,
                    quantity: 1,
                    unit_value: None,
                });
            }
            GiftKind::Fractional => {
                let quotas = gifts::lock_quotas(txn, row.id).await?;
                let mut gift = gifts::to_domain(row, quotas)?;
                let taken = gift.claim_quotas(item.quantity, selection_id)?;
                gifts::mark_quotas(txn, &taken, QuotaStatus::Selected, Some(selection_id))
                    .await?;
                gifts::write_gift_state(txn, &gift).await?;
                debug!(gift_id = %gift.id, quotas = taken.len(), status = ?gift.status(), "Quotas claimed");
                confirmed.push(ConfirmedItem {
                    gift_id: gift.id,
                    unit_value: gift.quota_value(),
                    gift_name: gift.attributes.name,
                    quantity: item.quantity,
                });
            }
        }
    }

    if !conflicts.is_empty() {
        return Ok(ClaimOutcome::Conflict {
            conflicting_gift_ids: conflicts,
        });
    }

    let selection = Selection {
        id: selection_id,
        event_id,
        guest_group_id,
        selected_at: Utc::now(),
        items: confirmed,
    };
    selections::insert_selection(txn, &selection).await?;
    Ok(ClaimOutcome::Confirmed(selection))
}

fn single_event<'a>(rows: impl Iterator<Item = &'a gift::Model>) -> Result<Uuid> {
    let mut event_ids = rows.map(|row| row.event_id);
    let first = event_ids.next().ok_or(Error::EmptyClaim)?;
    if event_ids.any(|id| id != first) {
        return Err(Error::CrossEventClaim);
    }
    Ok(first)
}

/// Releases everything still held by a selection. Returns the ids of the gifts that
/// had something released; gifts deleted since the claim are skipped.
#[instrument(skip(db, settings))]
pub async fn release_selection(
    db: &DatabaseConnection,
    settings: &ReservationSettings,
    selection_id: Uuid,
) -> Result<Vec<Uuid>> {
    release(db, settings, selection_id, None).await
}

/// Releases what a selection holds of one gift. Returns whether anything was released.
#[instrument(skip(db, settings))]
pub async fn release_gift(
    db: &DatabaseConnection,
    settings: &ReservationSettings,
    selection_id: Uuid,
    gift_id: Uuid,
) -> Result<bool> {
    let released = release(db, settings, selection_id, Some(gift_id)).await?;
    Ok(!released.is_empty())
}

async fn release(
    db: &DatabaseConnection,
    settings: &ReservationSettings,
    selection_id: Uuid,
    only_gift: Option<Uuid>,
) -> Result<Vec<Uuid>> {
    let selection = selections::find_selection(db, selection_id)
        .await?
        .ok_or(Error::SelectionNotFound { selection_id })?;

    let mut gift_ids = selection.gift_ids();
    if let Some(gift_id) = only_gift {
        if !gift_ids.contains(&gift_id) {
            return Err(Error::GiftNotFound { gift_id });
        }
        gift_ids = vec![gift_id];
    }

    let txn = begin_locking(db, settings).await?;
    let released = apply_release(&txn, selection_id, &gift_ids)
        .await
        .map_err(Error::into_locking)?;
    txn.commit().await.map_err(Error::from_locking)?;

    info!(released = released.len(), "Selection released");
    Ok(released)
}

async fn apply_release(
    txn: &DatabaseTransaction,
    selection_id: Uuid,
    gift_ids: &[Uuid],
) -> Result<Vec<Uuid>> {
    let mut released = Vec::new();
    for row in gifts::lock_gifts(txn, gift_ids).await? {
        let quotas = match row.kind {
            GiftKind::Integral => Vec::new(),
            GiftKind::Fractional => gifts::lock_quotas(txn, row.id).await?,
        };
        let mut gift = gifts::to_domain(row, quotas)?;
        if gift.release(selection_id) == 0 {
            continue;
        }
        if gift.kind() == GiftKind::Fractional {
            gifts::release_quotas(txn, gift.id, selection_id).await?;
        }
        gifts::write_gift_state(txn, &gift).await?;
        released.push(gift.id);
    }
    Ok(released)
}

/// Deletes a gift under the same locking discipline as claims, refusing while any
/// portion of it is claimed.
#[instrument(skip(db, settings))]
pub async fn delete_unclaimed_gift(
    db: &DatabaseConnection,
    settings: &ReservationSettings,
    gift_id: Uuid,
) -> Result<()> {
    let txn = begin_locking(db, settings).await?;
    let result = async {
        let row = gifts::lock_gifts(&txn, &[gift_id])
            .await?
            .into_iter()
            .next()
            .ok_or(Error::GiftNotFound { gift_id })?;
        let quotas = match row.kind {
            GiftKind::Integral => Vec::new(),
            GiftKind::Fractional => gifts::lock_quotas(&txn, gift_id).await?,
        };
        let gift = gifts::to_domain(row, quotas)?;
        if gift.has_claims() {
            return Err(Error::GiftHasClaims { gift_id });
        }
        gifts::delete_gift_rows(&txn, gift_id).await
    }
    .await
    .map_err(Error::into_locking);

    match result {
        Ok(()) => {
            txn.commit().await.map_err(Error::from_locking)?;
            info!("Gift deleted");
            Ok(())
        }
        Err(err) => {
            txn.rollback().await?;
            Err(err)
        }
    }
}
