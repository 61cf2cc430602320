//! # Organelle Core
//!
//! Registries, capability tags, snapshot trees and the traits shared by
//! every Organelle crate:
//!
//! - **Identity registry** - stable name ↔ identifier mapping per namespace
//! - **Capability registry** - capability tags attached to runtime types
//! - **Catalog** - the registries an application shares, injected explicitly
//! - **Snapshot trees** - generic, self-describing object state
//! - **Traits** - [`Identifiable`](identity::Identifiable),
//!   [`Capable`](capability::Capable), [`Effect`](effect::Effect),
//!   [`Reflect`](snapshot::Reflect)
//!
//! ## Quick Start
//!
//! ```rust
//! use organelle_core::prelude::*;
//!
//! let catalog = Catalog::new();
//! let alpha = catalog.namespace("D").resolve("Alpha");
//! assert_eq!(alpha, Identifier::new(1));
//! assert_eq!(catalog.namespace("D").resolve_existing("Beta"), Identifier::INVALID);
//! ```

pub mod capability;
pub mod catalog;
pub mod effect;
pub mod error;
pub mod identity;
pub mod prelude;
pub mod registry;
pub mod snapshot;
pub mod types;
