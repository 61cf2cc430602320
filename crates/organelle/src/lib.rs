//! # Organelle
//!
//! Runtime composition and reflection for Rust objects.
//!
//! Objects gain behavior by linking other objects into a [`Composite`]
//! instead of inheriting it. Every link records how the target is held
//! (owned, borrowed, transient), capability tags decide which linked
//! objects an effect reaches, and any object can describe its state as a
//! snapshot tree that transcoders turn into text and back.
//!
//! [`Composite`]: organelle_runtime::composite::Composite
//!
//! ## Quick Start
//!
//! ```rust
//! use organelle::prelude::*;
//! use std::sync::Arc;
//!
//! struct Battery {
//!     id: InstanceId,
//!     charge: i64,
//! }
//!
//! impl Identifiable for Battery {
//!     fn type_name(&self) -> &str { "battery" }
//!     fn instance_id(&self) -> InstanceId { self.id }
//! }
//!
//! impl Capable for Battery {
//!     fn declared_capabilities(&self) -> &[&'static str] { &["electrical"] }
//! }
//!
//! impl Composable for Battery {
//!     fn on_apply(&mut self, _effect: &dyn Effect) -> bool {
//!         self.charge -= 10;
//!         true
//!     }
//! }
//!
//! impl Reflect for Battery {
//!     fn capture(&self) -> SnapshotNode {
//!         SnapshotNode::group("battery", vec![SnapshotNode::value("charge", self.charge)])
//!     }
//!     fn restore(&mut self, node: &SnapshotNode) {
//!         if let Some(charge) = node.child_value("charge").and_then(Value::as_i64) {
//!             self.charge = charge;
//!         }
//!     }
//! }
//!
//! struct Device {
//!     id: InstanceId,
//!     parts: Composite,
//! }
//!
//! impl Identifiable for Device {
//!     fn type_name(&self) -> &str { "device" }
//!     fn instance_id(&self) -> InstanceId { self.id }
//! }
//!
//! impl Composable for Device {
//!     fn composite(&self) -> Option<&Composite> { Some(&self.parts) }
//!     fn composite_mut(&mut self) -> Option<&mut Composite> { Some(&mut self.parts) }
//! }
//!
//! struct Drain(InstanceId);
//!
//! impl Identifiable for Drain {
//!     fn type_name(&self) -> &str { "drain" }
//!     fn instance_id(&self) -> InstanceId { self.0 }
//! }
//!
//! impl Capable for Drain {
//!     fn declared_capabilities(&self) -> &[&'static str] { &["electrical"] }
//! }
//!
//! impl Effect for Drain {}
//!
//! let catalog = Catalog::shared();
//! let mut device = Device { id: InstanceId::new(), parts: Composite::new(Arc::clone(&catalog)) };
//! let battery = Battery { id: InstanceId::new(), charge: 100 };
//! device.parts.link(Target::boxed(battery), OwnershipKind::Owned).unwrap();
//!
//! apply_effect(&mut device, &Drain(InstanceId::new())).unwrap();
//!
//! let text = pipe(&device.parts, &KeyValueTranscoder::new());
//! assert!(text.contains("links[0].target.charge=90"));
//! ```
//!
//! ## Architecture
//!
//! - [`organelle_core`] - Identity and capability registries, snapshot trees, shared traits
//! - [`organelle_runtime`] - Composites, effect propagation, link graphs
//! - [`organelle_reflect`] - Key-value and JSON transcoders
//!
//! ## Ownership kinds
//!
//! | Kind | Unlink destroys target | Holder drop destroys target |
//! |------|------------------------|-----------------------------|
//! | Owned | yes | yes |
//! | Borrowed | no | no |
//! | Transient | no | no |
//! | Unrecognized | yes | yes |

// Re-export all subcrates
pub use organelle_core as core;
pub use organelle_reflect as reflect;
pub use organelle_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use organelle::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use organelle_core::types::{Identifier, InstanceId, OwnershipKind, Value};
    pub use organelle_core::registry::{namespace, IdentityRegistry, Namespaces};
    pub use organelle_core::capability::{Association, Capable, CapabilityRegistry, CapabilitySet};
    pub use organelle_core::catalog::Catalog;
    pub use organelle_core::snapshot::{NodeKind, Reflect, SnapshotNode};

    // Core traits
    pub use organelle_core::effect::Effect;
    pub use organelle_core::identity::Identifiable;

    // Error types
    pub use organelle_core::error::{LinkError, OrganelleError, PropagationError, Result};

    // Runtime
    pub use organelle_runtime::component::{share, with_lock, Component, Composable, SharedComponent};
    pub use organelle_runtime::composite::{Composite, LinkInfo, Target};
    pub use organelle_runtime::config::CompositeConfig;
    pub use organelle_runtime::propagate::{apply_effect, revert_effect};
    pub use organelle_runtime::topology::LinkGraph;

    // Reflection
    pub use organelle_reflect::format::Format;
    pub use organelle_reflect::json::JsonTranscoder;
    pub use organelle_reflect::key_value::KeyValueTranscoder;
    pub use organelle_reflect::pipe::{pipe, restore_from};
    pub use organelle_reflect::transcoder::{Transcoder, ENCODE_FAILURE};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
