//! Database configuration module for the gift registry.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Both `SQLite` (the default, and what the
//! tests use) and `PostgreSQL` URLs are accepted.

use crate::entities::{Gift, Quota, QuotaColumn, Selection, SelectionItem};
use crate::errors::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::Index,
};
use std::path::Path;
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/gift_buddy.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_directory(&database_url)?;
    connect(&database_url).await
}

/// Creates the parent directory of a file-backed `SQLite` database. Other URLs are
/// left alone.
pub fn ensure_sqlite_directory(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(file).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Connects to the given URL. Per-statement sqlx logging is disabled; operations log
/// through their own `tracing` spans instead.
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;
    debug!(backend = ?db.get_database_backend(), "Database connection established");
    Ok(db)
}

/// Creates all tables (if missing) from the entity definitions, plus the unique
/// index that keeps quota ordinals distinct per gift.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Gift).await?;
    create_table(db, &schema, Quota).await?;
    create_table(db, &schema, Selection).await?;
    create_table(db, &schema, SelectionItem).await?;

    let quota_ordinal_index = Index::create()
        .name("idx_quotas_gift_ordinal")
        .table(Quota)
        .col(QuotaColumn::GiftId)
        .col(QuotaColumn::Ordinal)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&quota_ordinal_index)).await?;

    info!("Database tables ensured");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(db.get_database_backend().build(&statement))
        .await?;
    Ok(())
}
