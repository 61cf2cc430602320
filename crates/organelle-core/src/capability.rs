//! Capability tags - what an object can take part in.
//!
//! A capability is a tag in the `capability` namespace. Every type declares
//! a static default set of tag names; the [`CapabilityRegistry`] can attach
//! further tags (and a handler deriving more tags) to a type identifier at
//! runtime, and any instance may override the whole set. Two objects are
//! compatible when their sets intersect.

use crate::registry::IdentityRegistry;
use crate::types::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// An ordered set of capability-tag identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Identifier>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Invalid identifiers are ignored.
    pub fn insert(&mut self, tag: Identifier) -> bool {
        tag.is_valid() && self.0.insert(tag)
    }

    pub fn contains(&self, tag: Identifier) -> bool {
        self.0.contains(&tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.0.iter().copied()
    }

    pub fn intersection(&self, other: &CapabilitySet) -> CapabilitySet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    pub fn union(&self, other: &CapabilitySet) -> CapabilitySet {
        Self(self.0.union(&other.0).copied().collect())
    }

    pub fn extend(&mut self, other: &CapabilitySet) {
        self.0.extend(other.iter());
    }

    /// Whether the two sets share at least one tag.
    pub fn intersects(&self, other: &CapabilitySet) -> bool {
        self.0.intersection(&other.0).next().is_some()
    }
}

impl FromIterator<Identifier> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Identifier>>(iter: I) -> Self {
        let mut set = CapabilitySet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// Static capability declarations of a runtime type.
pub trait Capable {
    /// Names of the tags every instance of this type carries.
    fn declared_capabilities(&self) -> &[&'static str] {
        &[]
    }

    /// Instance-level override. When `Some`, it replaces everything the
    /// type declares or the registry associates.
    fn capability_override(&self) -> Option<CapabilitySet> {
        None
    }
}

/// Derives extra tags from the tags a type already has.
pub type Extractor = Arc<dyn Fn(&CapabilitySet) -> CapabilitySet + Send + Sync>;

/// Tags (and optionally an extraction handler) attached to a type.
#[derive(Clone, Default)]
pub struct Association {
    pub tags: CapabilitySet,
    pub extractor: Option<Extractor>,
}

impl Association {
    pub fn tags(tags: CapabilitySet) -> Self {
        Self {
            tags,
            extractor: None,
        }
    }

    pub fn handler(
        extractor: impl Fn(&CapabilitySet) -> CapabilitySet + Send + Sync + 'static,
    ) -> Self {
        Self {
            tags: CapabilitySet::new(),
            extractor: Some(Arc::new(extractor)),
        }
    }

    pub fn with_handler(
        mut self,
        extractor: impl Fn(&CapabilitySet) -> CapabilitySet + Send + Sync + 'static,
    ) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }
}

impl fmt::Debug for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Association")
            .field("tags", &self.tags)
            .field("extractor", &self.extractor.is_some())
            .finish()
    }
}

/// Per-type capability metadata, keyed by type identifier.
#[derive(Debug)]
pub struct CapabilityRegistry {
    tags: Arc<IdentityRegistry>,
    associations: RwLock<HashMap<Identifier, Association>>,
}

impl CapabilityRegistry {
    /// `tags` is the namespace capability names are resolved in.
    pub fn new(tags: Arc<IdentityRegistry>) -> Self {
        Self {
            tags,
            associations: RwLock::new(HashMap::new()),
        }
    }

    pub fn tag_registry(&self) -> &Arc<IdentityRegistry> {
        &self.tags
    }

    /// Resolve (registering if needed) one capability tag.
    pub fn tag(&self, name: &str) -> Identifier {
        self.tags.resolve(name)
    }

    /// Resolve a list of tag names into a set.
    pub fn set_of<S: AsRef<str>>(&self, names: &[S]) -> CapabilitySet {
        names.iter().map(|name| self.tag(name.as_ref())).collect()
    }

    /// Tag names of a set, in identifier order. Unknown tags are skipped.
    pub fn names_of(&self, set: &CapabilitySet) -> Vec<Arc<str>> {
        set.iter().filter_map(|tag| self.tags.name_of(tag)).collect()
    }

    /// Attach tags and/or a handler to a type identifier.
    ///
    /// Tags accumulate across calls; a new handler replaces the old one.
    /// Returns `false` for the invalid identifier.
    pub fn associate(&self, type_id: Identifier, association: Association) -> bool {
        if !type_id.is_valid() {
            return false;
        }
        let mut associations = self
            .associations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = associations.entry(type_id).or_default();
        entry.tags.extend(&association.tags);
        if association.extractor.is_some() {
            entry.extractor = association.extractor;
        }
        true
    }

    /// Convenience for [`associate`](Self::associate) with tag names.
    pub fn associate_tags<S: AsRef<str>>(&self, type_id: Identifier, names: &[S]) -> bool {
        let tags = self.set_of(names);
        self.associate(type_id, Association::tags(tags))
    }

    /// The association stored for a type, if any.
    pub fn association(&self, type_id: Identifier) -> Option<Association> {
        self.associations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned()
    }

    /// Capabilities of a type: declared names, plus associated tags, plus
    /// whatever the type's handler derives from those.
    pub fn resolve_for<S: AsRef<str>>(&self, type_id: Identifier, declared: &[S]) -> CapabilitySet {
        let mut set = self.set_of(declared);
        if let Some(association) = self.association(type_id) {
            set.extend(&association.tags);
            // Handler runs outside the lock.
            if let Some(extractor) = association.extractor {
                let derived = extractor(&set);
                set.extend(&derived);
            }
        }
        set
    }
}
