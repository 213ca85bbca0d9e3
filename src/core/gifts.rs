//! Gift persistence - loading, locking, hydrating and writing gift and quota rows.
//!
//! The locking helpers must only be called inside a transaction; the locks they take
//! are held until that transaction commits or rolls back. Gifts are always locked in
//! ascending id order and quotas in ascending ordinal order so that two transactions
//! touching the same rows acquire them in the same order.

use crate::{
    domain::{Gift, GiftAttributes, GiftDetails, GiftShares, Quota, money},
    entities::{GiftKind, GiftStatus, QuotaStatus, gift, quota},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use std::collections::HashMap;

/// Rows per multi-row statement. Keeps every statement well under the bind-variable
/// limit of both backends (`SQLite` 32766, `PostgreSQL` 65535).
pub(crate) const BATCH_ROWS: usize = 1000;

/// Statuses that still have something to claim.
pub const CLAIMABLE_STATUSES: [GiftStatus; 2] =
    [GiftStatus::Available, GiftStatus::PartiallySelected];

/// Builds a domain gift from its row and (for fractional gifts) its quota rows.
pub fn to_domain(model: gift::Model, quotas: Vec<quota::Model>) -> Result<Gift> {
    let shares = match model.kind {
        GiftKind::Integral => GiftShares::Whole {
            selection_id: model.selection_id,
        },
        GiftKind::Fractional => {
            let total_cents = model.total_value_cents.ok_or_else(|| {
                corrupt(format!("fractional gift {} has no total value", model.id))
            })?;
            let quotas = quotas
                .into_iter()
                .map(quota_to_domain)
                .collect::<Result<Vec<_>>>()?;
            GiftShares::Split {
                total_value: money::from_cents(total_cents),
                quotas,
            }
        }
    };

    let attributes = GiftAttributes {
        name: model.name,
        description: model.description,
        photo_url: model.photo_url,
        is_favorite: model.is_favorite,
        category: model.category,
        details: GiftDetails {
            kind: model.detail_kind,
            store_link: model.store_link,
        },
    };

    Ok(Gift::restore(
        model.id,
        model.event_id,
        attributes,
        model.status,
        shares,
        model.created_at,
        model.updated_at,
    ))
}

fn quota_to_domain(model: quota::Model) -> Result<Quota> {
    let ordinal = u32::try_from(model.ordinal)
        .map_err(|_| corrupt(format!("quota {} has ordinal {}", model.id, model.ordinal)))?;
    Ok(Quota::restore(
        model.id,
        model.gift_id,
        ordinal,
        money::from_cents(model.value_cents),
        model.selection_id,
    ))
}

fn corrupt(message: String) -> Error {
    Error::Database(DbErr::Custom(message))
}

/// Inserts a new gift and all of its quotas. Call inside a transaction so the gift
/// never exists without its quotas.
pub async fn insert_gift<C>(db: &C, gift: &Gift) -> Result<()>
where
    C: ConnectionTrait,
{
    let total_value_cents = gift.total_value().map(money::to_cents).transpose()?;
    let selection_id = match gift.shares() {
        GiftShares::Whole { selection_id } => *selection_id,
        GiftShares::Split { .. } => None,
    };

    let model = gift::ActiveModel {
        id: Set(gift.id),
        event_id: Set(gift.event_id),
        name: Set(gift.attributes.name.clone()),
        description: Set(gift.attributes.description.clone()),
        photo_url: Set(gift.attributes.photo_url.clone()),
        is_favorite: Set(gift.attributes.is_favorite),
        category: Set(gift.attributes.category.clone()),
        detail_kind: Set(gift.attributes.details.kind),
        store_link: Set(gift.attributes.details.store_link.clone()),
        kind: Set(gift.kind()),
        status: Set(gift.status()),
        total_value_cents: Set(total_value_cents),
        selection_id: Set(selection_id),
        created_at: Set(gift.created_at),
        updated_at: Set(gift.updated_at),
    };
    gift::Entity::insert(model).exec_without_returning(db).await?;

    if gift.quotas().is_empty() {
        return Ok(());
    }
    let quotas = gift
        .quotas()
        .iter()
        .map(|q| {
            Ok(quota::ActiveModel {
                id: Set(q.id),
                gift_id: Set(q.gift_id),
                ordinal: Set(i32::try_from(q.ordinal)
                    .map_err(|_| Error::InvalidQuotaCount { count: q.ordinal })?),
                value_cents: Set(money::to_cents(q.value)?),
                status: Set(q.status()),
                selection_id: Set(q.selection_id()),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    for batch in quotas.chunks(BATCH_ROWS) {
        quota::Entity::insert_many(batch.to_vec())
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

/// Loads one gift with its quotas, without locking.
pub async fn find_gift<C>(db: &C, gift_id: Uuid) -> Result<Option<Gift>>
where
    C: ConnectionTrait,
{
    let Some(model) = gift::Entity::find_by_id(gift_id).one(db).await? else {
        return Ok(None);
    };
    let quotas = match model.kind {
        GiftKind::Integral => Vec::new(),
        GiftKind::Fractional => find_quotas(db, gift_id).await?,
    };
    to_domain(model, quotas).map(Some)
}

async fn find_quotas<C>(db: &C, gift_id: Uuid) -> Result<Vec<quota::Model>>
where
    C: ConnectionTrait,
{
    quota::Entity::find()
        .filter(quota::Column::GiftId.eq(gift_id))
        .order_by_asc(quota::Column::Ordinal)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists an event's gifts, favorites first then by name, optionally restricted to
/// the given statuses. Quotas are loaded with a single extra query.
pub async fn list_gifts<C>(
    db: &C,
    event_id: Uuid,
    statuses: Option<&[GiftStatus]>,
) -> Result<Vec<Gift>>
where
    C: ConnectionTrait,
{
    let mut query = gift::Entity::find().filter(gift::Column::EventId.eq(event_id));
    if let Some(statuses) = statuses {
        query = query.filter(gift::Column::Status.is_in(statuses.iter().copied()));
    }
    let models = query
        .order_by_desc(gift::Column::IsFavorite)
        .order_by_asc(gift::Column::Name)
        .order_by_asc(gift::Column::Id)
        .all(db)
        .await?;

    let fractional_ids: Vec<Uuid> = models
        .iter()
        .filter(|m| m.kind == GiftKind::Fractional)
        .map(|m| m.id)
        .collect();
    let mut quotas_by_gift: HashMap<Uuid, Vec<quota::Model>> = HashMap::new();
    if !fractional_ids.is_empty() {
        let quotas = quota::Entity::find()
            .filter(quota::Column::GiftId.is_in(fractional_ids))
            .order_by_asc(quota::Column::GiftId)
            .order_by_asc(quota::Column::Ordinal)
            .all(db)
            .await?;
        for q in quotas {
            quotas_by_gift.entry(q.gift_id).or_default().push(q);
        }
    }

    models
        .into_iter()
        .map(|model| {
            let quotas = quotas_by_gift.remove(&model.id).unwrap_or_default();
            to_domain(model, quotas)
        })
        .collect()
}

/// Counts the gifts listed on an event.
pub async fn count_gifts<C>(db: &C, event_id: Uuid) -> Result<u64>
where
    C: ConnectionTrait,
{
    gift::Entity::find()
        .filter(gift::Column::EventId.eq(event_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Loads the given gift rows with an exclusive row lock, in ascending id order.
/// Ids that do not resolve are simply absent from the result.
pub async fn lock_gifts<C>(txn: &C, gift_ids: &[Uuid]) -> Result<Vec<gift::Model>>
where
    C: ConnectionTrait,
{
    gift::Entity::find()
        .filter(gift::Column::Id.is_in(gift_ids.iter().copied()))
        .order_by_asc(gift::Column::Id)
        .lock_exclusive()
        .all(txn)
        .await
        .map_err(Into::into)
}

/// Loads a gift's quota rows with an exclusive row lock, in ascending ordinal order.
pub async fn lock_quotas<C>(txn: &C, gift_id: Uuid) -> Result<Vec<quota::Model>>
where
    C: ConnectionTrait,
{
    quota::Entity::find()
        .filter(quota::Column::GiftId.eq(gift_id))
        .order_by_asc(quota::Column::Ordinal)
        .lock_exclusive()
        .all(txn)
        .await
        .map_err(Into::into)
}

/// Writes a gift's claim state (status and integral back-pointer).
pub async fn write_gift_state<C>(txn: &C, gift: &Gift) -> Result<()>
where
    C: ConnectionTrait,
{
    let selection_id = match gift.shares() {
        GiftShares::Whole { selection_id } => *selection_id,
        GiftShares::Split { .. } => None,
    };
    gift::Entity::update_many()
        .col_expr(gift::Column::Status, Expr::value(gift.status()))
        .col_expr(gift::Column::SelectionId, Expr::value(selection_id))
        .col_expr(gift::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(gift::Column::Id.eq(gift.id))
        .exec(txn)
        .await?;
    Ok(())
}

/// Sets the status and owning selection of the given quotas.
pub async fn mark_quotas<C>(
    txn: &C,
    quota_ids: &[Uuid],
    status: QuotaStatus,
    selection_id: Option<Uuid>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    for batch in quota_ids.chunks(BATCH_ROWS) {
        quota::Entity::update_many()
            .col_expr(quota::Column::Status, Expr::value(status))
            .col_expr(quota::Column::SelectionId, Expr::value(selection_id))
            .filter(quota::Column::Id.is_in(batch.iter().copied()))
            .exec(txn)
            .await?;
    }
    Ok(())
}

/// Releases every quota of `gift_id` held by `selection_id`.
pub async fn release_quotas<C>(txn: &C, gift_id: Uuid, selection_id: Uuid) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = quota::Entity::update_many()
        .col_expr(quota::Column::Status, Expr::value(QuotaStatus::Available))
        .col_expr(quota::Column::SelectionId, Expr::value(Option::<Uuid>::None))
        .filter(quota::Column::GiftId.eq(gift_id))
        .filter(quota::Column::SelectionId.eq(selection_id))
        .exec(txn)
        .await?;
    Ok(result.rows_affected)
}

/// Overwrites the owner-editable columns. Never touches kind or claim state.
pub async fn write_attributes<C>(db: &C, gift_id: Uuid, attributes: &GiftAttributes) -> Result<()>
where
    C: ConnectionTrait,
{
    gift::Entity::update_many()
        .col_expr(gift::Column::Name, Expr::value(attributes.name.clone()))
        .col_expr(
            gift::Column::Description,
            Expr::value(attributes.description.clone()),
        )
        .col_expr(gift::Column::PhotoUrl, Expr::value(attributes.photo_url.clone()))
        .col_expr(gift::Column::IsFavorite, Expr::value(attributes.is_favorite))
        .col_expr(gift::Column::Category, Expr::value(attributes.category.clone()))
        .col_expr(gift::Column::DetailKind, Expr::value(attributes.details.kind))
        .col_expr(
            gift::Column::StoreLink,
            Expr::value(attributes.details.store_link.clone()),
        )
        .col_expr(gift::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(gift::Column::Id.eq(gift_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Deletes a gift and its quotas.
pub async fn delete_gift_rows<C>(txn: &C, gift_id: Uuid) -> Result<()>
where
    C: ConnectionTrait,
{
    quota::Entity::delete_many()
        .filter(quota::Column::GiftId.eq(gift_id))
        .exec(txn)
        .await?;
    gift::Entity::delete_by_id(gift_id).exec(txn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_insert_and_find_fractional_gift() -> Result<()> {
        let db = setup_test_db().await?;
        let gift = Gift::new_fractional(
            Uuid::new_v4(),
            GiftAttributes::named("Honeymoon"),
            Decimal::from(1000),
            5,
        )?;
        insert_gift(&db, &gift).await?;

        let found = find_gift(&db, gift.id).await?.unwrap();
        assert_eq!(found.id, gift.id);
        assert_eq!(found.kind(), GiftKind::Fractional);
        assert_eq!(found.total_value(), Some(Decimal::from(1000)));
        assert_eq!(found.quotas().len(), 5);
        assert_eq!(found.quotas()[4].ordinal, 5);
        assert_eq!(found.quota_value(), Some(Decimal::new(20000, 2)));

        assert!(find_gift(&db, Uuid::new_v4()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_gifts_orders_favorites_first() -> Result<()> {
        let db = setup_test_db().await?;
        let event = Uuid::new_v4();

        for (name, favorite) in [("Toaster", false), ("Blender", false), ("Zebra rug", true)] {
            let attributes = GiftAttributes {
                is_favorite: favorite,
                ..GiftAttributes::named(name)
            };
            insert_gift(&db, &Gift::new_integral(event, attributes)?).await?;
        }
        // Another event's gifts stay out of the listing
        insert_gift(
            &db,
            &Gift::new_integral(Uuid::new_v4(), GiftAttributes::named("Other"))?,
        )
        .await?;

        let names: Vec<String> = list_gifts(&db, event, None)
            .await?
            .into_iter()
            .map(|g| g.attributes.name)
            .collect();
        assert_eq!(names, vec!["Zebra rug", "Blender", "Toaster"]);
        assert_eq!(count_gifts(&db, event).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_gift_with_many_quotas_round_trips() -> Result<()> {
        let db = setup_test_db().await?;
        let count = 12_000;
        let gift = Gift::new_fractional(
            Uuid::new_v4(),
            GiftAttributes::named("Wedding fund"),
            Decimal::from(count * 10),
            count,
        )?;
        insert_gift(&db, &gift).await?;

        let selection = Uuid::new_v4();
        let taken: Vec<Uuid> = gift.quotas().iter().take(7_000).map(|q| q.id).collect();
        mark_quotas(&db, &taken, QuotaStatus::Selected, Some(selection)).await?;

        let found = find_gift(&db, gift.id).await?.unwrap();
        assert_eq!(found.quotas().len(), 12_000);
        assert_eq!(found.quotas()[11_999].ordinal, 12_000);
        assert_eq!(found.quota_value(), Some(Decimal::from(10)));
        assert_eq!(found.available_quota_count(), 5_000);
        assert_eq!(found.status(), GiftStatus::PartiallySelected);
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_and_release_quotas() -> Result<()> {
        let db = setup_test_db().await?;
        let gift = Gift::new_fractional(
            Uuid::new_v4(),
            GiftAttributes::named("Sofa"),
            Decimal::from(300),
            3,
        )?;
        insert_gift(&db, &gift).await?;
        let selection = Uuid::new_v4();

        let first_two: Vec<Uuid> = gift.quotas().iter().take(2).map(|q| q.id).collect();
        mark_quotas(&db, &first_two, QuotaStatus::Selected, Some(selection)).await?;

        let reloaded = find_gift(&db, gift.id).await?.unwrap();
        assert_eq!(reloaded.status(), GiftStatus::PartiallySelected);
        assert_eq!(reloaded.available_quota_count(), 1);

        assert_eq!(release_quotas(&db, gift.id, selection).await?, 2);
        let reloaded = find_gift(&db, gift.id).await?.unwrap();
        assert_eq!(reloaded.available_quota_count(), 3);
        Ok(())
    }
}
