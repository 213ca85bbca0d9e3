//! Gift Catalog Service - the entry point for owners and guests.
//!
//! Owner operations are authorized against the [`EventDirectory`] before anything else
//! happens. Guest claims resolve their access key through the [`GuestDirectory`] and are
//! handed to the reservation coordinator; this service never mutates claim state itself.

use crate::{
    config::{
        registry::{RegistryConfig, SeedShape},
        reservation::ReservationSettings,
    },
    core::{
        directory::{EventDirectory, GuestDirectory},
        gifts::{self, CLAIMABLE_STATUSES},
        reservation::{self, ClaimItem, ClaimOutcome},
        selections,
    },
    domain::{Gift, GiftAttributes, GiftShares, Selection},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A guest's claim as it arrives from the API layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub access_key: String,
    pub items: Vec<ClaimItem>,
}

/// One row of the administrative listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftClaimView {
    pub gift: Gift,
    /// Claiming guest group; `None` for an unclaimed gift
    pub guest_group_id: Option<Uuid>,
    pub access_key: Option<String>,
    /// Units held by this group: 1 for an integral gift, quotas for a fractional one
    pub quantity: u32,
    /// Latest claim by this group
    pub claimed_at: Option<DateTime<Utc>>,
}

impl GiftClaimView {
    fn unclaimed(gift: Gift) -> Self {
        Self {
            gift,
            guest_group_id: None,
            access_key: None,
            quantity: 0,
            claimed_at: None,
        }
    }
}

pub struct GiftCatalog<D> {
    db: DatabaseConnection,
    settings: ReservationSettings,
    directory: D,
}

impl<D> GiftCatalog<D>
where
    D: EventDirectory + GuestDirectory,
{
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: ReservationSettings, directory: D) -> Self {
        Self {
            db,
            settings,
            directory,
        }
    }

    async fn authorize(&self, actor: Uuid, event_id: Uuid) -> Result<()> {
        if self.directory.owns_event(actor, event_id).await? {
            Ok(())
        } else {
            warn!(%actor, %event_id, "Actor does not own event");
            Err(Error::NotAuthorized { actor, event_id })
        }
    }

    /// Creates an integral gift on an event the actor owns.
    #[instrument(skip(self, attributes))]
    pub async fn create_integral_gift(
        &self,
        actor: Uuid,
        event_id: Uuid,
        attributes: GiftAttributes,
    ) -> Result<Gift> {
        self.authorize(actor, event_id).await?;
        let gift = Gift::new_integral(event_id, attributes)?;
        self.insert(&gift).await?;
        info!(gift_id = %gift.id, name = %gift.attributes.name, "Integral gift created");
        Ok(gift)
    }

    /// Creates a fractional gift and all of its quotas on an event the actor owns.
    #[instrument(skip(self, attributes))]
    pub async fn create_fractional_gift(
        &self,
        actor: Uuid,
        event_id: Uuid,
        attributes: GiftAttributes,
        total_value: Decimal,
        quota_count: u32,
    ) -> Result<Gift> {
        self.authorize(actor, event_id).await?;
        let gift = Gift::new_fractional(event_id, attributes, total_value, quota_count)?;
        self.insert(&gift).await?;
        info!(
            gift_id = %gift.id,
            name = %gift.attributes.name,
            quota_value = ?gift.quota_value(),
            "Fractional gift created"
        );
        Ok(gift)
    }

    async fn insert(&self, gift: &Gift) -> Result<()> {
        let txn = self.db.begin().await?;
        gifts::insert_gift(&txn, gift).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Gifts guests can still claim from, favorites first then by name.
    #[instrument(skip(self))]
    pub async fn list_available_gifts(&self, event_id: Uuid) -> Result<Vec<Gift>> {
        gifts::list_gifts(&self.db, event_id, Some(&CLAIMABLE_STATUSES)).await
    }

    /// Every gift of the event with who claimed it. A fractional gift claimed by several
    /// guest groups yields one row per group.
    #[instrument(skip(self))]
    pub async fn list_all_gifts_with_selections(
        &self,
        actor: Uuid,
        event_id: Uuid,
    ) -> Result<Vec<GiftClaimView>> {
        self.authorize(actor, event_id).await?;
        let gifts = gifts::list_gifts(&self.db, event_id, None).await?;

        let selection_ids: HashSet<Uuid> = gifts.iter().flat_map(claiming_selections).collect();
        let claims = selections::find_selection_rows(&self.db, selection_ids.into_iter().collect())
            .await?;

        let mut keys: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut rows = Vec::with_capacity(gifts.len());
        for gift in gifts {
            let mut holders: Vec<(Option<Uuid>, u32, Option<DateTime<Utc>>)> = Vec::new();
            for selection_id in claiming_selections(&gift) {
                let claim = claims.get(&selection_id);
                let group = claim.map(|row| row.guest_group_id);
                let selected_at = claim.map(|row| row.selected_at);
                match holders.iter_mut().find(|(holder, ..)| *holder == group) {
                    Some((_, quantity, latest)) => {
                        *quantity += 1;
                        *latest = (*latest).max(selected_at);
                    }
                    None => holders.push((group, 1, selected_at)),
                }
            }

            if holders.is_empty() {
                rows.push(GiftClaimView::unclaimed(gift));
                continue;
            }
            for (group, quantity, claimed_at) in holders {
                let access_key = match group {
                    Some(group) => {
                        if !keys.contains_key(&group) {
                            let key = self.directory.access_key_for(group).await?;
                            keys.insert(group, key);
                        }
                        keys.get(&group).cloned().flatten()
                    }
                    None => None,
                };
                rows.push(GiftClaimView {
                    gift: gift.clone(),
                    guest_group_id: group,
                    access_key,
                    quantity,
                    claimed_at,
                });
            }
        }
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn get_gift(&self, gift_id: Uuid) -> Result<Gift> {
        gifts::find_gift(&self.db, gift_id)
            .await?
            .ok_or(Error::GiftNotFound { gift_id })
    }

    /// Replaces a gift's owner-editable attributes. Kind, quotas and claim state are
    /// never changed here.
    #[instrument(skip(self, attributes))]
    pub async fn update_gift(
        &self,
        actor: Uuid,
        gift_id: Uuid,
        attributes: GiftAttributes,
    ) -> Result<Gift> {
        let mut gift = self.get_gift(gift_id).await?;
        self.authorize(actor, gift.event_id).await?;
        gift.update_attributes(attributes)?;
        gifts::write_attributes(&self.db, gift_id, &gift.attributes).await?;
        info!("Gift updated");
        Ok(gift)
    }

    /// Deletes a gift that has nothing claimed.
    #[instrument(skip(self))]
    pub async fn delete_gift(&self, actor: Uuid, gift_id: Uuid) -> Result<()> {
        let gift = self.get_gift(gift_id).await?;
        self.authorize(actor, gift.event_id).await?;
        reservation::delete_unclaimed_gift(&self.db, &self.settings, gift_id).await
    }

    /// Claims gifts on behalf of the guest group behind the request's access key.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn claim(&self, request: &ClaimRequest) -> Result<ClaimOutcome> {
        reservation::validate_claim(&request.items)?;
        let guest_group_id = self
            .directory
            .resolve_access_key(&request.access_key)
            .await?
            .ok_or_else(|| {
                warn!("Claim with unrecognised access key");
                Error::AccessKeyNotFound
            })?;
        reservation::claim_gifts(&self.db, &self.settings, guest_group_id, &request.items).await
    }

    #[instrument(skip(self))]
    pub async fn get_selection(&self, selection_id: Uuid) -> Result<Selection> {
        selections::find_selection(&self.db, selection_id)
            .await?
            .ok_or(Error::SelectionNotFound { selection_id })
    }

    /// Releases everything a selection still holds. Returns the released gift ids.
    #[instrument(skip(self))]
    pub async fn release_selection(&self, actor: Uuid, selection_id: Uuid) -> Result<Vec<Uuid>> {
        let selection = self.get_selection(selection_id).await?;
        self.authorize(actor, selection.event_id).await?;
        reservation::release_selection(&self.db, &self.settings, selection_id).await
    }

    /// Releases what a selection holds of one gift. Returns whether anything was released.
    #[instrument(skip(self))]
    pub async fn release_gift(
        &self,
        actor: Uuid,
        selection_id: Uuid,
        gift_id: Uuid,
    ) -> Result<bool> {
        let selection = self.get_selection(selection_id).await?;
        self.authorize(actor, selection.event_id).await?;
        reservation::release_gift(&self.db, &self.settings, selection_id, gift_id).await
    }

    /// Seeds every configured event that has no gifts yet, acting as the event's owner.
    /// An event's gifts are built first and inserted in one transaction, so a bad seed
    /// leaves the event empty and the next run tries again. Returns the number of gifts
    /// created.
    #[instrument(skip(self, config))]
    pub async fn seed_registry(&self, config: &RegistryConfig) -> Result<usize> {
        let mut created = 0;
        for event in &config.events {
            let existing = gifts::count_gifts(&self.db, event.id).await?;
            if existing > 0 {
                info!(event_id = %event.id, existing, "Event already has gifts, skipping seed");
                continue;
            }
            self.authorize(event.owner, event.id).await?;

            let seeded = config
                .gifts_for(event.id)
                .map(|seed| match seed.shape()? {
                    SeedShape::Integral => Gift::new_integral(event.id, seed.attributes()),
                    SeedShape::Fractional {
                        total_value,
                        quotas,
                    } => Gift::new_fractional(event.id, seed.attributes(), total_value, quotas),
                })
                .collect::<Result<Vec<_>>>()?;
            if seeded.is_empty() {
                continue;
            }

            let txn = self.db.begin().await?;
            for gift in &seeded {
                gifts::insert_gift(&txn, gift).await?;
            }
            txn.commit().await?;
            info!(event_id = %event.id, gifts = seeded.len(), "Event seeded");
            created += seeded.len();
        }

        let orphans = config
            .gifts
            .iter()
            .filter(|gift| config.owner_of(gift.event).is_none())
            .count();
        if orphans > 0 {
            warn!(orphans, "Seed gifts reference events that are not configured");
        }
        Ok(created)
    }
}

/// Selection ids currently holding some part of the gift, one entry per held unit, in
/// quota ordinal order.
fn claiming_selections(gift: &Gift) -> Vec<Uuid> {
    match gift.shares() {
        GiftShares::Whole { selection_id } => selection_id.iter().copied().collect(),
        GiftShares::Split { quotas, .. } => quotas.iter().filter_map(|q| q.selection_id()).collect(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        config::registry::parse_config,
        core::directory::StaticDirectory,
        domain::GiftDetails,
        entities::{DetailKind, GiftStatus},
        test_utils::*,
    };

    fn request(access_key: &str, items: &[(Uuid, u32)]) -> ClaimRequest {
        ClaimRequest {
            access_key: access_key.to_string(),
            items: items
                .iter()
                .map(|(gift_id, quantity)| ClaimItem::new(*gift_id, *quantity))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_gifts_requires_ownership() -> Result<()> {
        let (catalog, registry) = setup_test_catalog().await?;
        let stranger = Uuid::new_v4();

        let result = catalog
            .create_integral_gift(stranger, registry.event_id, GiftAttributes::named("Toaster"))
            .await;
        assert!(matches!(result, Err(Error::NotAuthorized { actor, .. }) if actor == stranger));

        let result = catalog
            .create_fractional_gift(
                stranger,
                registry.event_id,
                GiftAttributes::named("Honeymoon"),
                Decimal::from(1000),
                5,
            )
            .await;
        assert!(matches!(result, Err(Error::NotAuthorized { .. })));

        assert!(catalog.list_available_gifts(registry.event_id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_gifts_validates_before_writing() -> Result<()> {
        let (catalog, registry) = setup_test_catalog().await?;
        let owner = registry.owner;
        let event = registry.event_id;

        let result = catalog
            .create_integral_gift(owner, event, GiftAttributes::named(" "))
            .await;
        assert!(matches!(result, Err(Error::InvalidGiftDetails { .. })));

        let result = catalog
            .create_fractional_gift(owner, event, GiftAttributes::named("Sofa"), Decimal::ZERO, 3)
            .await;
        assert!(matches!(result, Err(Error::InvalidTotalValue { .. })));

        let result = catalog
            .create_fractional_gift(owner, event, GiftAttributes::named("Sofa"), Decimal::from(300), 1)
            .await;
        assert!(matches!(result, Err(Error::InvalidQuotaCount { count: 1 })));

        assert!(catalog.list_available_gifts(event).await?.is_empty());

        let gift = catalog
            .create_fractional_gift(owner, event, GiftAttributes::named("Sofa"), Decimal::from(300), 3)
            .await?;
        let stored = catalog.get_gift(gift.id).await?;
        assert_eq!(stored.quotas().len(), 3);
        assert_eq!(stored.quota_value(), Some(Decimal::from(100)));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_available_hides_fully_claimed_gifts() -> Result<()> {
        let (catalog, registry) = setup_test_catalog().await?;
        let owner = registry.owner;
        let event = registry.event_id;

        let toaster = catalog
            .create_integral_gift(owner, event, GiftAttributes::named("Toaster"))
            .await?;
        let sofa = catalog
            .create_fractional_gift(owner, event, GiftAttributes::named("Sofa"), Decimal::from(300), 3)
            .await?;
        let favorite = GiftAttributes {
            is_favorite: true,
            ..GiftAttributes::named("Vase")
        };
        let vase = catalog.create_integral_gift(owner, event, favorite).await?;

        catalog
            .claim(&request(registry.access_key, &[(toaster.id, 1), (sofa.id, 1)]))
            .await?;

        let available = catalog.list_available_gifts(event).await?;
        let ids: Vec<Uuid> = available.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![vase.id, sofa.id]);
        assert_eq!(available[1].status(), GiftStatus::PartiallySelected);
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_resolves_access_key() -> Result<()> {
        let (catalog, registry) = setup_test_catalog().await?;
        let toaster = catalog
            .create_integral_gift(registry.owner, registry.event_id, GiftAttributes::named("Toaster"))
            .await?;

        let result = catalog.claim(&request("NOT-A-KEY", &[(toaster.id, 1)])).await;
        assert!(matches!(result, Err(Error::AccessKeyNotFound)));

        let outcome = catalog
            .claim(&request(registry.access_key, &[(toaster.id, 1)]))
            .await?;
        let selection = outcome.selection().unwrap();
        assert_eq!(selection.guest_group_id, registry.guest_group);
        assert_eq!(catalog.get_selection(selection.id).await?.items, selection.items);

        let outcome = catalog
            .claim(&request(registry.other_access_key, &[(toaster.id, 1)]))
            .await?;
        assert_eq!(
            outcome,
            ClaimOutcome::Conflict {
                conflicting_gift_ids: vec![toaster.id]
            }
        );

        let result = catalog.get_selection(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::SelectionNotFound { .. })));
        Ok(())
    }

    #[test]
    fn test_claim_request_deserializes_from_json() {
        let gift_id = Uuid::new_v4();
        let json = format!(
            r#"{{"accessKey":"SUNFLOWER","items":[{{"giftId":"{gift_id}","quantity":2}}]}}"#
        );
        let parsed: ClaimRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request("SUNFLOWER", &[(gift_id, 2)]));
    }

    #[tokio::test]
    async fn test_admin_listing_one_row_per_claiming_group() -> Result<()> {
        let (catalog, registry) = setup_test_catalog().await?;
        let owner = registry.owner;
        let event = registry.event_id;

        let honeymoon = catalog
            .create_fractional_gift(owner, event, GiftAttributes::named("Honeymoon"), Decimal::from(1000), 5)
            .await?;
        let toaster = catalog
            .create_integral_gift(owner, event, GiftAttributes::named("Toaster"))
            .await?;
        let kettle = catalog
            .create_integral_gift(owner, event, GiftAttributes::named("Kettle"))
            .await?;

        catalog
            .claim(&request(registry.access_key, &[(honeymoon.id, 1), (toaster.id, 1)]))
            .await?;
        catalog
            .claim(&request(registry.other_access_key, &[(honeymoon.id, 2)]))
            .await?;
        let last = catalog
            .claim(&request(registry.access_key, &[(honeymoon.id, 1)]))
            .await?;

        let result = catalog
            .list_all_gifts_with_selections(Uuid::new_v4(), event)
            .await;
        assert!(matches!(result, Err(Error::NotAuthorized { .. })));

        let rows = catalog.list_all_gifts_with_selections(owner, event).await?;
        let summary: Vec<(&str, Option<&str>, u32)> = rows
            .iter()
            .map(|row| {
                (
                    row.gift.attributes.name.as_str(),
                    row.access_key.as_deref(),
                    row.quantity,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Honeymoon", Some(registry.access_key), 2),
                ("Honeymoon", Some(registry.other_access_key), 2),
                ("Kettle", None, 0),
                ("Toaster", Some(registry.access_key), 1),
            ]
        );
        let latest = catalog.get_selection(last.selection().unwrap().id).await?;
        assert_eq!(rows[0].claimed_at, Some(latest.selected_at));
        assert_eq!(rows[2].gift.id, kettle.id);
        assert!(rows[2].claimed_at.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_gift_keeps_claim_state() -> Result<()> {
        let (catalog, registry) = setup_test_catalog().await?;
        let sofa = catalog
            .create_fractional_gift(
                registry.owner,
                registry.event_id,
                GiftAttributes::named("Sofa"),
                Decimal::from(300),
                3,
            )
            .await?;
        catalog
            .claim(&request(registry.access_key, &[(sofa.id, 2)]))
            .await?;

        let attributes = GiftAttributes {
            description: "Three-seater".to_string(),
            details: GiftDetails::external_product("https://shop.example/sofa"),
            ..GiftAttributes::named("Grey sofa")
        };
        let result = catalog
            .update_gift(Uuid::new_v4(), sofa.id, attributes.clone())
            .await;
        assert!(matches!(result, Err(Error::NotAuthorized { .. })));

        catalog.update_gift(registry.owner, sofa.id, attributes).await?;
        let stored = catalog.get_gift(sofa.id).await?;
        assert_eq!(stored.attributes.name, "Grey sofa");
        assert_eq!(stored.attributes.details.kind, DetailKind::ExternalProduct);
        assert_eq!(stored.status(), GiftStatus::PartiallySelected);
        assert_eq!(stored.available_quota_count(), 1);

        let broken = GiftAttributes {
            details: GiftDetails {
                kind: DetailKind::ExternalProduct,
                store_link: None,
            },
            ..GiftAttributes::named("Grey sofa")
        };
        let result = catalog.update_gift(registry.owner, sofa.id, broken).await;
        assert!(matches!(result, Err(Error::InvalidGiftDetails { .. })));

        let result = catalog.get_gift(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::GiftNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_release_and_delete_are_owner_only() -> Result<()> {
        let (catalog, registry) = setup_test_catalog().await?;
        let toaster = catalog
            .create_integral_gift(registry.owner, registry.event_id, GiftAttributes::named("Toaster"))
            .await?;
        let outcome = catalog
            .claim(&request(registry.access_key, &[(toaster.id, 1)]))
            .await?;
        let selection_id = outcome.selection().unwrap().id;
        let stranger = Uuid::new_v4();

        assert!(matches!(
            catalog.release_selection(stranger, selection_id).await,
            Err(Error::NotAuthorized { .. })
        ));
        assert!(matches!(
            catalog.delete_gift(stranger, toaster.id).await,
            Err(Error::NotAuthorized { .. })
        ));
        assert!(matches!(
            catalog.delete_gift(registry.owner, toaster.id).await,
            Err(Error::GiftHasClaims { .. })
        ));

        assert!(catalog.release_gift(registry.owner, selection_id, toaster.id).await?);
        assert!(!catalog.release_gift(registry.owner, selection_id, toaster.id).await?);
        assert!(catalog.release_selection(registry.owner, selection_id).await?.is_empty());

        catalog.delete_gift(registry.owner, toaster.id).await?;
        assert!(matches!(
            catalog.get_gift(toaster.id).await,
            Err(Error::GiftNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_seed_leaves_event_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let broken = r#"
            [[events]]
            id = "6f0c1f3e-5b7a-4c43-9b1e-0d2a7c3e9a10"
            owner = "0b5e2d44-8a1f-4e6b-a3c2-7f9d1e2b3c4d"

            [[gifts]]
            event = "6f0c1f3e-5b7a-4c43-9b1e-0d2a7c3e9a10"
            name = "Toaster"

            [[gifts]]
            event = "6f0c1f3e-5b7a-4c43-9b1e-0d2a7c3e9a10"
            name = "Sofa"
            total_value = 300
            quotas = 1
            "#;
        let config = parse_config(broken)?;
        let catalog = GiftCatalog::new(
            db,
            ReservationSettings::default(),
            StaticDirectory::from_config(&config),
        );
        let event = config.events[0].id;

        let result = catalog.seed_registry(&config).await;
        assert!(matches!(result, Err(Error::InvalidQuotaCount { count: 1 })));
        assert_eq!(gifts::count_gifts(&catalog.db, event).await?, 0);

        // Once the file is fixed the event is seeded on the next run
        let config = parse_config(&broken.replace("quotas = 1", "quotas = 3"))?;
        assert_eq!(catalog.seed_registry(&config).await?, 2);
        assert_eq!(gifts::count_gifts(&catalog.db, event).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_created_total_matches_stored_total() -> Result<()> {
        let (catalog, registry) = setup_test_catalog().await?;
        let gift = catalog
            .create_fractional_gift(
                registry.owner,
                registry.event_id,
                GiftAttributes::named("Honeymoon"),
                Decimal::new(1_000_005, 3),
                5,
            )
            .await?;
        let stored = catalog.get_gift(gift.id).await?;
        assert_eq!(gift.total_value(), Some(Decimal::new(100_001, 2)));
        assert_eq!(stored.total_value(), gift.total_value());
        assert_eq!(stored.quota_value(), gift.quota_value());
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_registry_runs_once_per_event() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(
            r#"
            [[events]]
            id = "6f0c1f3e-5b7a-4c43-9b1e-0d2a7c3e9a10"
            owner = "0b5e2d44-8a1f-4e6b-a3c2-7f9d1e2b3c4d"

            [[guest_groups]]
            id = "a7d3c2b1-4e5f-4a6b-8c7d-9e0f1a2b3c4d"
            event = "6f0c1f3e-5b7a-4c43-9b1e-0d2a7c3e9a10"
            access_key = "SUNFLOWER"

            [[gifts]]
            event = "6f0c1f3e-5b7a-4c43-9b1e-0d2a7c3e9a10"
            name = "Toaster"

            [[gifts]]
            event = "6f0c1f3e-5b7a-4c43-9b1e-0d2a7c3e9a10"
            name = "Honeymoon"
            favorite = true
            total_value = 1000
            quotas = 4

            [[gifts]]
            event = "11111111-2222-4333-8444-555555555555"
            name = "Orphan"
            "#,
        )?;
        let catalog = GiftCatalog::new(
            db,
            ReservationSettings::default(),
            StaticDirectory::from_config(&config),
        );

        assert_eq!(catalog.seed_registry(&config).await?, 2);
        assert_eq!(catalog.seed_registry(&config).await?, 0);

        let event = config.events[0].id;
        let gifts = catalog.list_available_gifts(event).await?;
        let names: Vec<&str> = gifts.iter().map(|g| g.attributes.name.as_str()).collect();
        assert_eq!(names, vec!["Honeymoon", "Toaster"]);
        assert_eq!(gifts[0].quota_value(), Some(Decimal::from(250)));

        let outcome = catalog
            .claim(&request("SUNFLOWER", &[(gifts[0].id, 4)]))
            .await?;
        assert_eq!(outcome.selection().unwrap().total_value(), Decimal::from(1000));
        Ok(())
    }
}
