//! Group registry.
//!
//! The process creates one registry at startup, registers its groups, and
//! hands the registry to the peer server. After startup it is read-only in
//! practice; lookups take a shared lock, creation an exclusive one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::group::{Group, Loader};

/// Name → group lookup shared by local callers and the peer server.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a group. See [`Group::new`].
    pub fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: usize,
        loader: impl Loader + 'static,
    ) -> Arc<Group> {
        self.register(Group::new(name, cache_bytes, loader))
    }

    /// Registers an already built group, replacing any group of the same name.
    pub fn register(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        let previous = self
            .groups
            .write()
            .insert(group.name().to_string(), Arc::clone(&group));

        if previous.is_some() {
            warn!(group = group.name(), "group replaced");
        } else {
            info!(group = group.name(), "group registered");
        }
        group
    }

    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Registered group names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered groups, sorted by name.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        let mut groups: Vec<Arc<Group>> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));
        groups
    }
}
