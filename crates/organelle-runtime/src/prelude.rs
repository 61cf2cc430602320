//! Organelle Runtime Prelude.

pub use crate::component::{lock, share, with_lock, Component, Composable, SharedComponent, WeakComponent};
pub use crate::composite::{Composite, LinkInfo, LinkedMut, LinkedRef, Target};
pub use crate::config::CompositeConfig;
pub use crate::propagate::{apply_effect, revert_effect, Direction};
pub use crate::topology::{LinkEdge, LinkGraph, LinkNode};
