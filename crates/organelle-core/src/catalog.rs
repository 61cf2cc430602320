//! Catalog - the registries an application shares.
//!
//! Rather than reaching for process-wide singletons, an application builds
//! one `Catalog` and hands an `Arc` of it to every composite it creates.
//! Tests build their own, so ids never leak between them.

use crate::capability::{Association, Capable, CapabilityRegistry, CapabilitySet};
use crate::identity::Identifiable;
use crate::registry::{namespace, IdentityRegistry, Namespaces};
use crate::types::{Identifier, OwnershipKind};
use std::sync::Arc;

/// Namespaces, type registry and capability registry bundled together.
#[derive(Debug)]
pub struct Catalog {
    namespaces: Namespaces,
    types: Arc<IdentityRegistry>,
    capabilities: CapabilityRegistry,
}

impl Catalog {
    pub fn new() -> Self {
        let namespaces = Namespaces::new();
        let types = namespaces.namespace(namespace::TYPE);
        let capabilities = CapabilityRegistry::new(namespaces.namespace(namespace::CAPABILITY));

        // Ownership kinds get stable ids 1..=5 in declaration order.
        let ownership = namespaces.namespace(namespace::OWNERSHIP_KIND);
        for kind in OwnershipKind::ALL {
            ownership.resolve(kind.as_str());
        }

        Self {
            namespaces,
            types,
            capabilities,
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Get or create an arbitrary namespace.
    pub fn namespace(&self, name: &str) -> Arc<IdentityRegistry> {
        self.namespaces.namespace(name)
    }

    pub fn types(&self) -> &IdentityRegistry {
        &self.types
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    /// Resolve a type name, registering it on first use.
    pub fn type_id(&self, type_name: &str) -> Identifier {
        self.types.resolve(type_name)
    }

    /// Type identifier of an object.
    pub fn type_id_of<T: Identifiable + ?Sized>(&self, object: &T) -> Identifier {
        self.types.resolve(object.type_name())
    }

    /// Identifier of an ownership kind in the `ownership-kind` namespace.
    pub fn ownership_id(&self, kind: OwnershipKind) -> Identifier {
        self.namespace(namespace::OWNERSHIP_KIND)
            .resolve_existing(kind.as_str())
    }

    /// Attach tags or a handler to a type by name.
    pub fn associate(&self, type_name: &str, association: Association) -> bool {
        self.capabilities
            .associate(self.type_id(type_name), association)
    }

    /// Full capability set of an instance. Does not register its type.
    pub fn capabilities_of<T>(&self, instance: &T) -> CapabilitySet
    where
        T: Identifiable + Capable + ?Sized,
    {
        if let Some(set) = instance.capability_override() {
            return set;
        }
        let type_id = self.types.resolve_existing(instance.type_name());
        self.capabilities
            .resolve_for(type_id, instance.declared_capabilities())
    }

    /// Tags shared by two instances; non-empty means compatible.
    pub fn matches<A, B>(&self, a: &A, b: &B) -> CapabilitySet
    where
        A: Identifiable + Capable + ?Sized,
        B: Identifiable + Capable + ?Sized,
    {
        self.capabilities_of(a).intersection(&self.capabilities_of(b))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
