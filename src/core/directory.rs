//! Collaborator seams: event ownership and access-key resolution.
//!
//! The engine trusts whatever these return and never re-validates credentials.

use crate::config::registry::RegistryConfig;
use crate::errors::Result;
use std::collections::HashMap;
use uuid::Uuid;

/// Answers "does this actor own this event".
pub trait EventDirectory {
    async fn owns_event(&self, actor: Uuid, event_id: Uuid) -> Result<bool>;
}

/// Maps guest-facing access keys to guest groups and back.
pub trait GuestDirectory {
    async fn resolve_access_key(&self, access_key: &str) -> Result<Option<Uuid>>;

    async fn access_key_for(&self, guest_group_id: Uuid) -> Result<Option<String>>;
}

/// Directory backed by the tables in config.toml.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    owners: HashMap<Uuid, Uuid>,
    groups_by_key: HashMap<String, Uuid>,
    keys_by_group: HashMap<Uuid, String>,
}

impl StaticDirectory {
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        let mut directory = Self::default();
        for event in &config.events {
            directory.add_event(event.id, event.owner);
        }
        for group in &config.guest_groups {
            directory.add_guest_group(group.id, &group.access_key);
        }
        directory
    }

    pub fn add_event(&mut self, event_id: Uuid, owner: Uuid) {
        self.owners.insert(event_id, owner);
    }

    /// Registers a guest group. Access keys are matched exactly after trimming.
    pub fn add_guest_group(&mut self, guest_group_id: Uuid, access_key: &str) {
        let key = access_key.trim().to_string();
        self.groups_by_key.insert(key.clone(), guest_group_id);
        self.keys_by_group.insert(guest_group_id, key);
    }
}

impl EventDirectory for StaticDirectory {
    async fn owns_event(&self, actor: Uuid, event_id: Uuid) -> Result<bool> {
        Ok(self.owners.get(&event_id) == Some(&actor))
    }
}

impl GuestDirectory for StaticDirectory {
    async fn resolve_access_key(&self, access_key: &str) -> Result<Option<Uuid>> {
        Ok(self.groups_by_key.get(access_key.trim()).copied())
    }

    async fn access_key_for(&self, guest_group_id: Uuid) -> Result<Option<String>> {
        Ok(self.keys_by_group.get(&guest_group_id).cloned())
    }
}
