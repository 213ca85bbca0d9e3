use dotenvy::dotenv;
use gift_buddy::{
    config::{database, registry, reservation::ReservationSettings},
    core::{catalog::GiftCatalog, directory::StaticDirectory},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenv().ok();

    // 3. Load the registry file and reservation settings
    let config = registry::load_default_config()
        .inspect_err(|e| error!("Failed to load registry configuration: {}", e))?;
    let settings = ReservationSettings::from_env()
        .inspect_err(|e| error!("Invalid reservation settings: {}", e))?;
    info!(
        events = config.events.len(),
        guest_groups = config.guest_groups.len(),
        lock_timeout_ms = settings.lock_timeout.as_millis(),
        "Configuration loaded"
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed events that have no gifts yet
    let catalog = GiftCatalog::new(db, settings, StaticDirectory::from_config(&config));
    let seeded = catalog
        .seed_registry(&config)
        .await
        .inspect_err(|e| error!("Failed to seed gifts: {}", e))?;
    info!(seeded, "Registry seeding finished");

    // 6. Startup summary
    for event in &config.events {
        let available = catalog.list_available_gifts(event.id).await?;
        info!(event_id = %event.id, available = available.len(), "Event ready");
    }

    Ok(())
}
