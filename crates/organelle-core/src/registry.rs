//! Identity registry - stable name ↔ identifier mapping per namespace.
//!
//! Each [`IdentityRegistry`] is one namespace. Entries are append-only:
//! once a name is given an identifier, the pair lives as long as the
//! registry and is never renumbered. Lookups take a read lock; first-time
//! registration re-checks under the write lock so that concurrent callers
//! racing on the same name all observe the same identifier.

use crate::types::Identifier;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Well-known namespace names.
pub mod namespace {
    pub const TYPE: &str = "type";
    pub const CAPABILITY: &str = "capability";
    pub const OWNERSHIP_KIND: &str = "ownership-kind";
    pub const STATE_KIND: &str = "state-kind";
}

#[derive(Debug, Default)]
struct Entries {
    by_name: HashMap<Arc<str>, Identifier>,
    /// Index `i` holds the name of identifier `i + 1`.
    names: Vec<Arc<str>>,
}

/// Bidirectional name ↔ identifier mapping for one namespace.
#[derive(Debug)]
pub struct IdentityRegistry {
    namespace: String,
    entries: RwLock<Entries>,
}

impl IdentityRegistry {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(Entries::default()),
        }
    }

    /// The namespace this registry partitions.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Return the identifier of `name`, registering it if absent.
    ///
    /// Empty or whitespace-only names yield [`Identifier::INVALID`] and are
    /// not registered.
    pub fn resolve(&self, name: &str) -> Identifier {
        if !is_valid_name(name) {
            return Identifier::INVALID;
        }

        let existing = self.resolve_existing(name);
        if existing.is_valid() {
            return existing;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have registered it between the two locks.
        if let Some(id) = entries.by_name.get(name) {
            return *id;
        }

        let Ok(raw) = u32::try_from(entries.names.len() + 1) else {
            tracing::warn!(namespace = %self.namespace, "identifier space exhausted");
            return Identifier::INVALID;
        };
        let id = Identifier::new(raw);
        let key: Arc<str> = Arc::from(name);
        entries.names.push(Arc::clone(&key));
        entries.by_name.insert(key, id);
        tracing::trace!(namespace = %self.namespace, name, id = id.get(), "registered name");
        id
    }

    /// Return the identifier of `name` without ever registering it.
    pub fn resolve_existing(&self, name: &str) -> Identifier {
        if !is_valid_name(name) {
            return Identifier::INVALID;
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .by_name
            .get(name)
            .copied()
            .unwrap_or(Identifier::INVALID)
    }

    /// Reverse lookup. `None` for the invalid sentinel and unknown ids.
    pub fn name_of(&self, id: Identifier) -> Option<Arc<str>> {
        if !id.is_valid() {
            return None;
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.names.get(id.get() as usize - 1).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve_existing(name).is_valid()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All `(identifier, name)` pairs in registration order.
    pub fn entries(&self) -> Vec<(Identifier, Arc<str>)> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (Identifier::new(i as u32 + 1), Arc::clone(name)))
            .collect()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// The set of namespaces known to a catalog.
///
/// Hands out one shared [`IdentityRegistry`] per namespace name, creating
/// it on first request.
#[derive(Debug, Default)]
pub struct Namespaces {
    registries: RwLock<HashMap<String, Arc<IdentityRegistry>>>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the registry for `name`.
    pub fn namespace(&self, name: &str) -> Arc<IdentityRegistry> {
        if let Some(registry) = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(registry);
        }

        let mut registries = self.registries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            registries
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(IdentityRegistry::new(name))),
        )
    }

    /// The registry for `name`, if it was ever requested.
    pub fn existing(&self, name: &str) -> Option<Arc<IdentityRegistry>> {
        self.registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of all namespaces, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn alpha_beta_scenario() {
        let registry = IdentityRegistry::new("D");
        assert_eq!(registry.resolve("Alpha"), Identifier::new(1));
        assert_eq!(registry.resolve("Beta"), Identifier::new(2));
        assert_eq!(registry.resolve_existing("Alpha"), Identifier::new(1));
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let registry = IdentityRegistry::new("type");
        let ids: HashSet<Identifier> = ["cell", "organ", "neuron", "plasmid"]
            .iter()
            .map(|name| registry.resolve(name))
            .collect();
        assert_eq!(ids.len(), 4);
        assert!(ids.iter().all(|id| id.is_valid()));
    }

    #[test]
    fn resolve_is_idempotent() {
        let registry = IdentityRegistry::new("type");
        let first = registry.resolve("cell");
        assert_eq!(registry.resolve("cell"), first);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_existing_never_registers() {
        let registry = IdentityRegistry::new("type");
        assert_eq!(registry.resolve_existing("ghost"), Identifier::INVALID);
        assert!(registry.is_empty());
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn empty_names_are_invalid() {
        let registry = IdentityRegistry::new("type");
        assert_eq!(registry.resolve(""), Identifier::INVALID);
        assert_eq!(registry.resolve("   "), Identifier::INVALID);
        assert!(registry.is_empty());
    }

    #[test]
    fn name_of_round_trips_and_rejects_unknown() {
        let registry = IdentityRegistry::new("type");
        let id = registry.resolve("ribosome");
        assert_eq!(registry.name_of(id).as_deref(), Some("ribosome"));
        assert_eq!(registry.name_of(Identifier::INVALID), None);
        assert_eq!(registry.name_of(Identifier::new(99)), None);
    }

    #[test]
    fn concurrent_first_resolves_converge() {
        let registry = IdentityRegistry::new("type");
        let ids: Vec<Identifier> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| registry.resolve("mitochondrion")))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn entries_are_in_registration_order() {
        let registry = IdentityRegistry::new("type");
        registry.resolve("a");
        registry.resolve("b");
        let entries = registry.entries();
        assert_eq!(entries[0].0, Identifier::new(1));
        assert_eq!(&*entries[1].1, "b");
    }

    #[test]
    fn namespaces_partition_identifiers() {
        let namespaces = Namespaces::new();
        let types = namespaces.namespace(namespace::TYPE);
        let tags = namespaces.namespace(namespace::CAPABILITY);
        assert_eq!(types.resolve("motile"), Identifier::new(1));
        assert_eq!(tags.resolve("flagellum"), Identifier::new(1));
        assert_eq!(tags.resolve("motile"), Identifier::new(2));
        assert!(Arc::ptr_eq(&types, &namespaces.namespace(namespace::TYPE)));
        assert_eq!(namespaces.names(), vec!["capability", "type"]);
        assert!(namespaces.existing("state-kind").is_none());
    }
}
