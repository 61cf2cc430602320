//! # Organelle Runtime
//!
//! The composition core. Objects gain behavior by linking other objects
//! into their [`Composite`](composite::Composite) rather than inheriting
//! it, and cross-cutting effects spread along those links.
//!
//! - [`component`] - the traits a linkable object implements
//! - [`composite`] - ownership-tagged link slots indexed by type
//! - [`propagate`] - depth-first effect application and reversal
//! - [`topology`] - petgraph view of a link graph

pub mod component;
pub mod composite;
pub mod config;
pub mod prelude;
pub mod propagate;
pub mod topology;
