//! Registry seed configuration loaded from config.toml
//!
//! The file holds the tables the external collaborators would normally own (which actor
//! owns which event, which access key belongs to which guest group) plus the gifts used
//! to seed an event's registry on first run.

use crate::domain::{GiftAttributes, GiftDetails};
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

const CONFIG_PATH_VAR: &str = "GIFT_BUDDY_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct RegistryConfig {
    /// Events and their owners
    #[serde(default)]
    pub events: Vec<EventConfig>,
    /// Guest groups and their access keys
    #[serde(default)]
    pub guest_groups: Vec<GuestGroupConfig>,
    /// Gifts to seed
    #[serde(default)]
    pub gifts: Vec<GiftConfig>,
}

/// An event and the actor allowed to manage it
#[derive(Debug, Deserialize, Clone)]
pub struct EventConfig {
    pub id: Uuid,
    pub owner: Uuid,
}

/// A guest group and the opaque key its members use to claim gifts
#[derive(Debug, Deserialize, Clone)]
pub struct GuestGroupConfig {
    pub id: Uuid,
    pub event: Uuid,
    pub access_key: String,
}

/// Configuration for a single seeded gift. A gift with `total_value` and `quotas`
/// is fractional, one without both is integral.
#[derive(Debug, Deserialize, Clone)]
pub struct GiftConfig {
    /// Event the gift is listed on
    pub event: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub favorite: bool,
    /// Link to an external store; makes the gift an external product
    #[serde(default)]
    pub store_link: Option<String>,
    #[serde(default)]
    pub total_value: Option<Decimal>,
    #[serde(default)]
    pub quotas: Option<u32>,
}

/// How a seeded gift should be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedShape {
    Integral,
    Fractional { total_value: Decimal, quotas: u32 },
}

impl GiftConfig {
    /// Builds the owner-editable attributes for this gift.
    #[must_use]
    pub fn attributes(&self) -> GiftAttributes {
        GiftAttributes {
            name: self.name.clone(),
            description: self.description.clone(),
            photo_url: self.photo_url.clone(),
            is_favorite: self.favorite,
            category: self.category.clone(),
            details: self
                .store_link
                .as_ref()
                .map_or_else(GiftDetails::plain, GiftDetails::external_product),
        }
    }

    /// Integral or fractional, rejecting a half-specified fractional gift.
    pub fn shape(&self) -> Result<SeedShape> {
        match (self.total_value, self.quotas) {
            (None, None) => Ok(SeedShape::Integral),
            (Some(total_value), Some(quotas)) => Ok(SeedShape::Fractional {
                total_value,
                quotas,
            }),
            _ => Err(Error::Config {
                message: format!(
                    "Gift '{}' must set both total_value and quotas, or neither",
                    self.name
                ),
            }),
        }
    }
}

impl RegistryConfig {
    /// Owner of the given event, if configured.
    #[must_use]
    pub fn owner_of(&self, event_id: Uuid) -> Option<Uuid> {
        self.events
            .iter()
            .find(|event| event.id == event_id)
            .map(|event| event.owner)
    }

    /// Checks that every guest group belongs to a configured event and that access
    /// keys are present and unique.
    pub fn validate(&self) -> Result<()> {
        let mut keys = HashSet::with_capacity(self.guest_groups.len());
        for group in &self.guest_groups {
            if self.owner_of(group.event).is_none() {
                return Err(Error::Config {
                    message: format!(
                        "Guest group {} references unknown event {}",
                        group.id, group.event
                    ),
                });
            }
            let key = group.access_key.trim();
            if key.is_empty() || !keys.insert(key) {
                return Err(Error::Config {
                    message: format!("Guest group {} needs a unique access key", group.id),
                });
            }
        }
        Ok(())
    }

    /// Seeded gifts for one event, in file order.
    pub fn gifts_for(&self, event_id: Uuid) -> impl Iterator<Item = &GiftConfig> {
        self.gifts.iter().filter(move |gift| gift.event == event_id)
    }
}

/// Loads registry configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RegistryConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.as_ref().display()),
    })?;

    parse_config(&contents)
}

/// Parses registry configuration from TOML text
pub fn parse_config(contents: &str) -> Result<RegistryConfig> {
    let config: RegistryConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads registry configuration from `GIFT_BUDDY_CONFIG`, or ./config.toml by default
pub fn load_default_config() -> Result<RegistryConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
