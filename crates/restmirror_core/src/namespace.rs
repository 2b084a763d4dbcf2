//! Namespace management.
//!
//! A namespace is an isolated [`EntityStore`] sharing the schema with every
//! other namespace. Exactly one is active. The reserved [`BASE_NAMESPACE`]
//! is the default context and is never a switch target.

use crate::config::BASE_NAMESPACE;
use crate::error::{CoreError, CoreResult};
use crate::schema::Schema;
use crate::store::EntityStore;
use std::collections::{BTreeSet, HashMap};

/// Result of [`NamespaceManager::switch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    /// Namespace active before the call.
    pub previous: String,
    /// Namespace active after the call.
    pub active: String,
    /// Whether the active namespace changed.
    pub changed: bool,
    /// Whether the target had never been active before.
    pub first_activation: bool,
    /// Segment types that were emptied and must be fetched again.
    pub refetch: Vec<String>,
}

/// Owns every namespace's store.
#[derive(Debug)]
pub struct NamespaceManager {
    identity_field: String,
    active_id: String,
    active: EntityStore,
    parked: HashMap<String, EntityStore>,
    fetched: BTreeSet<String>,
}

impl NamespaceManager {
    /// Creates a manager whose only namespace is `initial`.
    pub fn new(identity_field: impl Into<String>, initial: impl Into<String>) -> Self {
        let identity_field = identity_field.into();
        Self {
            active: EntityStore::new(identity_field.clone()),
            identity_field,
            active_id: initial.into(),
            parked: HashMap::new(),
            fetched: BTreeSet::new(),
        }
    }

    /// Returns the active namespace id.
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Returns true while the base namespace is active.
    pub fn is_base(&self) -> bool {
        self.active_id == BASE_NAMESPACE
    }

    /// Returns the active store.
    pub fn store(&self) -> &EntityStore {
        &self.active
    }

    /// Returns the active store mutably.
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.active
    }

    /// Returns every namespace id known to the manager, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.parked.keys().cloned().collect();
        ids.push(self.active_id.clone());
        ids.sort();
        ids
    }

    /// Records that `type_name` was fetched without narrowing parameters.
    pub fn mark_fetched(&mut self, type_name: &str) {
        self.fetched.insert(type_name.to_string());
    }

    /// Returns true if `type_name` was ever fetched in this process.
    pub fn was_fetched(&self, type_name: &str) -> bool {
        self.fetched.contains(type_name)
    }

    /// Activates namespace `id`.
    ///
    /// On first activation the new store starts as a deep copy of the
    /// current store's non-segment types; a revisited namespace keeps its
    /// own records. Segment types of the target are emptied either way, and
    /// those fetched before are listed for refetch.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ReservedNamespace`] for the base namespace.
    pub fn switch(&mut self, id: &str, schema: &Schema) -> CoreResult<SwitchOutcome> {
        if id == BASE_NAMESPACE {
            return Err(CoreError::reserved_namespace(id));
        }
        let previous = self.active_id.clone();
        if id == previous {
            return Ok(SwitchOutcome {
                previous,
                active: id.to_string(),
                changed: false,
                first_activation: false,
                refetch: Vec::new(),
            });
        }

        let (mut target, first_activation) = match self.parked.remove(id) {
            Some(store) => (store, false),
            None => {
                let mut store = EntityStore::new(self.identity_field.clone());
                for (type_name, type_schema) in schema.iter() {
                    if type_schema.segment {
                        continue;
                    }
                    if let Some(collection) = self.active.collection(type_name) {
                        store.set_collection(type_name, collection.clone());
                    }
                }
                (store, true)
            }
        };

        let mut refetch = Vec::new();
        for (type_name, type_schema) in schema.iter() {
            if !type_schema.segment {
                continue;
            }
            target.clear_type(type_name);
            if self.was_fetched(type_name) {
                refetch.push(type_name.to_string());
            }
        }

        let old = std::mem::replace(&mut self.active, target);
        self.parked.insert(previous.clone(), old);
        self.active_id = id.to_string();
        tracing::debug!(
            from = previous.as_str(),
            to = id,
            first_activation,
            refetch = refetch.len(),
            "namespace switched"
        );

        Ok(SwitchOutcome {
            previous,
            active: id.to_string(),
            changed: true,
            first_activation,
            refetch,
        })
    }
}
