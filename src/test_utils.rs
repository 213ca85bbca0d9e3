//! Shared test utilities for the gift registry.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test gifts with sensible defaults.

use crate::{
    config::reservation::ReservationSettings,
    core::{catalog::GiftCatalog, directory::StaticDirectory, gifts},
    domain::{Gift, GiftAttributes},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
///
/// The pool holds exactly one connection: every connection to `sqlite::memory:` opens
/// its own empty database, and a single connection also means concurrent transactions
/// queue on the pool the way they would queue on row locks.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an available integral gift directly in storage.
///
/// # Defaults
/// * no description, photo or category
/// * not a favorite, plain details
pub async fn create_test_integral_gift(
    db: &DatabaseConnection,
    event_id: Uuid,
    name: &str,
) -> Result<Gift> {
    let gift = Gift::new_integral(event_id, GiftAttributes::named(name))?;
    gifts::insert_gift(db, &gift).await?;
    Ok(gift)
}

/// Creates an available fractional gift worth `total_value` (whole currency units)
/// split into `quotas` quotas.
pub async fn create_test_fractional_gift(
    db: &DatabaseConnection,
    event_id: Uuid,
    name: &str,
    total_value: i64,
    quotas: u32,
) -> Result<Gift> {
    let gift = Gift::new_fractional(
        event_id,
        GiftAttributes::named(name),
        Decimal::from(total_value),
        quotas,
    )?;
    gifts::insert_gift(db, &gift).await?;
    Ok(gift)
}

/// Identities registered in the directory built by [`setup_test_catalog`].
pub struct TestRegistry {
    pub event_id: Uuid,
    pub owner: Uuid,
    pub guest_group: Uuid,
    pub access_key: &'static str,
    pub other_guest_group: Uuid,
    pub other_access_key: &'static str,
}

/// Creates a catalog over a fresh test database with one event, its owner and two
/// guest groups.
pub async fn setup_test_catalog() -> Result<(GiftCatalog<StaticDirectory>, TestRegistry)> {
    let db = setup_test_db().await?;
    let registry = TestRegistry {
        event_id: Uuid::new_v4(),
        owner: Uuid::new_v4(),
        guest_group: Uuid::new_v4(),
        access_key: "SUNFLOWER",
        other_guest_group: Uuid::new_v4(),
        other_access_key: "MARIGOLD",
    };

    let mut directory = StaticDirectory::default();
    directory.add_event(registry.event_id, registry.owner);
    directory.add_guest_group(registry.guest_group, registry.access_key);
    directory.add_guest_group(registry.other_guest_group, registry.other_access_key);

    let catalog = GiftCatalog::new(db, ReservationSettings::default(), directory);
    Ok((catalog, registry))
}
