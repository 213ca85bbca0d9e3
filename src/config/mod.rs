/// Database configuration and connection management
pub mod database;

/// Registry seed file (events, guest groups, gifts) loaded from config.toml
pub mod registry;

/// Reservation engine settings from environment variables
pub mod reservation;
