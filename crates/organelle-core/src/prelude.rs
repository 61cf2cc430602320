//! Organelle Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use organelle_core::prelude::*;
//! ```

pub use crate::types::{Identifier, InstanceId, OwnershipKind, Value};

pub use crate::registry::{namespace, IdentityRegistry, Namespaces};

pub use crate::capability::{Association, Capable, CapabilityRegistry, CapabilitySet, Extractor};

pub use crate::catalog::Catalog;

pub use crate::identity::Identifiable;

pub use crate::effect::{canonical, Effect};

pub use crate::snapshot::{NodeKind, Reflect, SnapshotNode};

pub use crate::error::{LinkError, OrganelleError, PropagationError, Result};
