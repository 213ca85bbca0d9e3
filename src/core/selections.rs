//! Selection persistence. Selections are append-only: inserted once, then only read.

use crate::{
    core::gifts::BATCH_ROWS,
    domain::{ConfirmedItem, Selection, money},
    entities::{selection, selection_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;

/// Inserts a selection row and its line items in request order.
pub async fn insert_selection<C>(txn: &C, selection: &Selection) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = selection::ActiveModel {
        id: Set(selection.id),
        event_id: Set(selection.event_id),
        guest_group_id: Set(selection.guest_group_id),
        selected_at: Set(selection.selected_at),
    };
    selection::Entity::insert(row)
        .exec_without_returning(txn)
        .await?;

    if selection.items.is_empty() {
        return Ok(());
    }
    let items = selection
        .items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            Ok(selection_item::ActiveModel {
                selection_id: Set(selection.id),
                position: Set(to_i32(position)?),
                gift_id: Set(item.gift_id),
                gift_name: Set(item.gift_name.clone()),
                quantity: Set(to_i32(item.quantity)?),
                unit_value_cents: Set(item.unit_value.map(money::to_cents).transpose()?),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>>>()?;
    for batch in items.chunks(BATCH_ROWS) {
        selection_item::Entity::insert_many(batch.to_vec())
            .exec_without_returning(txn)
            .await?;
    }
    Ok(())
}

fn to_i32<T>(value: T) -> Result<i32>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    value.try_into().map_err(|_| {
        Error::Database(DbErr::Custom(format!("{value} does not fit an integer column")))
    })
}

/// Loads a selection and its line items.
pub async fn find_selection<C>(db: &C, selection_id: Uuid) -> Result<Option<Selection>>
where
    C: ConnectionTrait,
{
    let Some(row) = selection::Entity::find_by_id(selection_id).one(db).await? else {
        return Ok(None);
    };
    let items = selection_item::Entity::find()
        .filter(selection_item::Column::SelectionId.eq(selection_id))
        .order_by_asc(selection_item::Column::Position)
        .all(db)
        .await?;

    let items = items
        .into_iter()
        .map(|item| {
            Ok(ConfirmedItem {
                gift_id: item.gift_id,
                gift_name: item.gift_name,
                quantity: u32::try_from(item.quantity).map_err(|_| {
                    Error::Database(DbErr::Custom(format!(
                        "selection item {} has quantity {}",
                        item.id, item.quantity
                    )))
                })?,
                unit_value: item.unit_value_cents.map(money::from_cents),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(Selection {
        id: row.id,
        event_id: row.event_id,
        guest_group_id: row.guest_group_id,
        selected_at: row.selected_at,
        items,
    }))
}

/// Loads selection header rows by id, keyed by id. Unknown ids are skipped.
pub async fn find_selection_rows<C>(
    db: &C,
    selection_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, selection::Model>>
where
    C: ConnectionTrait,
{
    if selection_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = selection::Entity::find()
        .filter(selection::Column::Id.is_in(selection_ids))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|row| (row.id, row)).collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_insert_and_find_selection() -> Result<()> {
        let db = setup_test_db().await?;
        let selection = Selection {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            guest_group_id: Uuid::new_v4(),
            selected_at: Utc::now(),
            items: vec![
                ConfirmedItem {
                    gift_id: Uuid::new_v4(),
                    gift_name: "Toaster".to_string(),
                    quantity: 1,
                    unit_value: None,
                },
                ConfirmedItem {
                    gift_id: Uuid::new_v4(),
                    gift_name: "Honeymoon".to_string(),
                    quantity: 3,
                    unit_value: Some(Decimal::new(20000, 2)),
                },
            ],
        };
        insert_selection(&db, &selection).await?;

        let found = find_selection(&db, selection.id).await?.unwrap();
        assert_eq!(found.items, selection.items);
        assert_eq!(found.guest_group_id, selection.guest_group_id);
        assert_eq!(found.total_value(), Decimal::from(600));

        assert!(find_selection(&db, Uuid::new_v4()).await?.is_none());

        let rows = find_selection_rows(&db, vec![selection.id, Uuid::new_v4()]).await?;
        assert_eq!(rows.len(), 1);
        assert!(rows.contains_key(&selection.id));
        Ok(())
    }
}
