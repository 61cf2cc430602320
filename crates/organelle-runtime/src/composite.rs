//! Composite - an object's set of ownership-tagged links.
//!
//! Instead of inheriting behavior, an object gains it by linking other
//! objects into its composite, the way a host cell keeps its
//! mitochondria. Links are indexed by the linked object's type identifier
//! and a composite holds at most one active link per type.
//!
//! Slots move through `Empty → Active → Empty`. Unlinking never shrinks
//! the slot storage; freed slots are reused by the next link.

use crate::component::{Component, SharedComponent, WeakComponent};
use crate::config::CompositeConfig;
use organelle_core::capability::CapabilitySet;
use organelle_core::catalog::Catalog;
use organelle_core::error::LinkError;
use organelle_core::identity::Identifiable;
use organelle_core::snapshot::{NodeKind, Reflect, SnapshotNode};
use organelle_core::types::{Identifier, InstanceId, OwnershipKind};
use std::fmt;
use std::sync::{Arc, Mutex, TryLockError};

/// What to link.
pub enum Target {
    /// A component the composite takes sole ownership of.
    Boxed(Box<dyn Component>),
    /// A shared component. Owned links must be given the only strong
    /// handle; borrowed links keep a weak one and need another owner.
    Shared(SharedComponent),
    /// A weak handle, for borrowed links. An expired handle is a null
    /// target.
    Weak(WeakComponent),
}

impl Target {
    pub fn boxed<T: Component>(component: T) -> Self {
        Target::Boxed(Box::new(component))
    }

    pub fn shared(component: &SharedComponent) -> Self {
        Target::Shared(Arc::clone(component))
    }

    pub fn weak(component: &SharedComponent) -> Self {
        Target::Weak(Arc::downgrade(component))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Boxed(b) => write!(f, "Boxed({})", b.type_name()),
            Target::Shared(_) => f.write_str("Shared(..)"),
            Target::Weak(w) => write!(f, "Weak(live: {})", w.strong_count() > 0),
        }
    }
}

pub(crate) enum Held {
    Boxed(Box<dyn Component>),
    Strong(SharedComponent),
    Weak(WeakComponent),
}

pub(crate) struct Slot {
    pub(crate) type_id: Identifier,
    pub(crate) instance: Option<InstanceId>,
    pub(crate) kind: OwnershipKind,
    pub(crate) held: Option<Held>,
}

impl Slot {
    fn empty() -> Self {
        Self {
            type_id: Identifier::INVALID,
            instance: None,
            kind: OwnershipKind::Empty,
            held: None,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.kind != OwnershipKind::Empty
    }
}

/// A linked object as seen from its holder.
pub enum LinkedRef<'a> {
    Owned(&'a (dyn Component + 'static)),
    Shared(SharedComponent),
}

impl LinkedRef<'_> {
    /// Run `f` against the linked object. `None` if a shared target is
    /// locked elsewhere.
    pub fn visit<R>(&self, f: impl FnOnce(&dyn Component) -> R) -> Option<R> {
        match self {
            LinkedRef::Owned(component) => Some(f(*component)),
            LinkedRef::Shared(shared) => try_visit(shared, |c| f(c)),
        }
    }
}

/// Mutable access to a linked object.
pub enum LinkedMut<'a> {
    Owned(&'a mut (dyn Component + 'static)),
    Shared(SharedComponent),
}

impl LinkedMut<'_> {
    pub fn visit_mut<R>(&mut self, f: impl FnOnce(&mut dyn Component) -> R) -> Option<R> {
        match self {
            LinkedMut::Owned(component) => Some(f(&mut **component)),
            LinkedMut::Shared(shared) => match shared.try_lock() {
                Ok(mut guard) => Some(f(&mut *guard)),
                Err(TryLockError::Poisoned(poisoned)) => Some(f(&mut *poisoned.into_inner())),
                Err(TryLockError::WouldBlock) => None,
            },
        }
    }
}

/// Summary of one active link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkInfo {
    pub slot: usize,
    pub type_id: Identifier,
    pub instance: InstanceId,
    pub kind: OwnershipKind,
}

/// Growable collection of ownership-tagged links, indexed by type.
pub struct Composite {
    catalog: Arc<Catalog>,
    pub(crate) slots: Vec<Slot>,
    capacity_hint: usize,
}

impl Composite {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_capacity(catalog, CompositeConfig::default().capacity_hint)
    }

    pub fn with_capacity(catalog: Arc<Catalog>, capacity_hint: usize) -> Self {
        Self {
            catalog,
            slots: Vec::with_capacity(capacity_hint),
            capacity_hint,
        }
    }

    pub fn with_config(catalog: Arc<Catalog>, config: &CompositeConfig) -> Self {
        Self::with_capacity(catalog, config.capacity_hint)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn capacity_hint(&self) -> usize {
        self.capacity_hint
    }

    /// Number of slots, including empty ones awaiting reuse.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    /// Type identifier and instance id the target would be linked under.
    ///
    /// Performs every check [`link`](Self::link) does without consuming the
    /// target.
    pub fn check_link(
        &self,
        target: &Target,
        kind: OwnershipKind,
    ) -> Result<(Identifier, InstanceId), LinkError> {
        if kind == OwnershipKind::Empty {
            return Err(LinkError::InvalidArgument("empty is not a link kind"));
        }

        let (type_name, instance) = match target {
            Target::Boxed(_) if kind.is_borrowed() => {
                return Err(LinkError::InvalidArgument(
                    "a borrowed link cannot take ownership of a boxed target",
                ));
            }
            Target::Boxed(component) => (component.type_name().to_string(), component.instance_id()),
            Target::Shared(shared) if kind.destroys_target() && Arc::strong_count(shared) > 1 => {
                return Err(LinkError::InvalidArgument(
                    "an owned link must hold the only handle to a shared target",
                ));
            }
            Target::Shared(shared) if kind.is_borrowed() && Arc::strong_count(shared) == 1 => {
                return Err(LinkError::InvalidArgument(
                    "a borrowed link cannot take the last handle to a shared target",
                ));
            }
            Target::Shared(shared) => describe(shared)?,
            Target::Weak(_) if kind.destroys_target() => {
                return Err(LinkError::InvalidArgument("an owned link cannot hold a weak handle"));
            }
            Target::Weak(weak) => {
                let shared = weak
                    .upgrade()
                    .ok_or(LinkError::InvalidArgument("null target"))?;
                describe(&shared)?
            }
        };

        let type_id = self.catalog.type_id(&type_name);
        if !type_id.is_valid() {
            return Err(LinkError::InvalidIdentifier);
        }
        if self.find_slot(type_id).is_some() {
            return Err(LinkError::AlreadyLinked(type_id));
        }
        Ok((type_id, instance))
    }

    /// Link `target` under its type identifier.
    ///
    /// Reuses the first empty slot, otherwise appends one, and returns the
    /// slot index. On failure no slot changes; a rejected boxed target is
    /// dropped with the call, so use [`check_link`](Self::check_link) first
    /// to keep it.
    pub fn link(&mut self, target: Target, kind: OwnershipKind) -> Result<usize, LinkError> {
        let (type_id, instance) = match self.check_link(&target, kind) {
            Ok(checked) => checked,
            Err(err) => {
                tracing::debug!(?target, %kind, error = %err, "link rejected");
                return Err(err);
            }
        };

        let held = match target {
            Target::Boxed(component) => Held::Boxed(component),
            Target::Shared(shared) if kind.destroys_target() => Held::Strong(shared),
            Target::Shared(shared) => Held::Weak(Arc::downgrade(&shared)),
            Target::Weak(weak) => Held::Weak(weak),
        };

        let slot = Slot {
            type_id,
            instance: Some(instance),
            kind,
            held: Some(held),
        };

        let index = match self.slots.iter().position(|s| !s.is_active()) {
            Some(free) => {
                self.slots[free] = slot;
                free
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        tracing::debug!(slot = index, type_id = type_id.get(), %kind, "linked");
        Ok(index)
    }

    /// Break the active link of `type_id`.
    ///
    /// Owned targets are destroyed before this returns. The slot is marked
    /// empty and kept for reuse. Returns `false` when nothing of that type
    /// is linked.
    pub fn unlink(&mut self, type_id: Identifier) -> bool {
        let Some(index) = self.find_slot(type_id) else {
            return false;
        };
        let slot = std::mem::replace(&mut self.slots[index], Slot::empty());
        tracing::debug!(slot = index, type_id = type_id.get(), kind = %slot.kind, "unlinked");
        drop(slot);
        true
    }

    /// Unlink everything; returns how many links were broken.
    pub fn unlink_all(&mut self) -> usize {
        let type_ids: Vec<Identifier> = self.type_ids();
        type_ids.into_iter().filter(|id| self.unlink(*id)).count()
    }

    /// Slot holding the active link of `type_id`.
    ///
    /// Scans from the most recently added slot backwards; the newest match
    /// wins.
    pub fn find_slot(&self, type_id: Identifier) -> Option<usize> {
        if !type_id.is_valid() {
            return None;
        }
        self.slots
            .iter()
            .rposition(|s| s.is_active() && s.type_id == type_id)
    }

    /// Slot holding the active link of a type, by type name.
    pub fn find_slot_by_name(&self, type_name: &str) -> Option<usize> {
        self.find_slot(self.catalog.types().resolve_existing(type_name))
    }

    /// The object linked at `slot`. `None` for out-of-range or empty slots
    /// and for borrowed targets that no longer exist.
    pub fn linked_object(&self, slot: usize) -> Option<LinkedRef<'_>> {
        let slot = self.slots.get(slot).filter(|s| s.is_active())?;
        match slot.held.as_ref()? {
            Held::Boxed(component) => Some(LinkedRef::Owned(component.as_ref())),
            Held::Strong(shared) => Some(LinkedRef::Shared(Arc::clone(shared))),
            Held::Weak(weak) => weak.upgrade().map(LinkedRef::Shared),
        }
    }

    pub fn linked_object_mut(&mut self, slot: usize) -> Option<LinkedMut<'_>> {
        let slot = self.slots.get_mut(slot).filter(|s| s.is_active())?;
        match slot.held.as_mut()? {
            Held::Boxed(component) => Some(LinkedMut::Owned(component.as_mut())),
            Held::Strong(shared) => Some(LinkedMut::Shared(Arc::clone(shared))),
            Held::Weak(weak) => weak.upgrade().map(LinkedMut::Shared),
        }
    }

    /// Ownership kind of the link at `slot`; `None` for out-of-range or
    /// empty slots.
    pub fn link_kind_of(&self, slot: usize) -> Option<OwnershipKind> {
        self.slots
            .get(slot)
            .filter(|s| s.is_active())
            .map(|s| s.kind)
    }

    /// All active links, in slot order.
    pub fn links(&self) -> impl Iterator<Item = LinkInfo> + '_ {
        self.slots.iter().enumerate().filter_map(|(slot, s)| {
            Some(LinkInfo {
                slot,
                type_id: s.type_id,
                instance: s.instance?,
                kind: s.kind,
            })
            .filter(|_| s.is_active())
        })
    }

    pub fn type_ids(&self) -> Vec<Identifier> {
        self.links().map(|l| l.type_id).collect()
    }

    /// Active slots whose target shares at least one capability with
    /// `probe`. Expired or busy targets are skipped.
    pub fn select(&self, probe: &CapabilitySet) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&slot| {
                self.linked_object(slot)
                    .and_then(|linked| {
                        linked.visit(|c| self.catalog.capabilities_of(c).intersects(probe))
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Snapshot of the links: a list with one group per active slot.
    ///
    /// Owned targets are captured in place; borrowed ones (and owned shared
    /// targets locked elsewhere) become references.
    pub fn capture_links(&self) -> SnapshotNode {
        let mut links = SnapshotNode::list("links", Vec::new());
        for slot in &self.slots {
            let Some(instance) = slot.instance.filter(|_| slot.is_active()) else {
                continue;
            };
            let type_name = self
                .catalog
                .types()
                .name_of(slot.type_id)
                .map(|n| n.to_string())
                .unwrap_or_default();

            let target = match slot.held.as_ref() {
                Some(Held::Boxed(component)) => Some(component.capture()),
                Some(Held::Strong(shared)) => try_visit(shared, |c| c.capture()),
                _ => None,
            };
            let target = match target {
                Some(mut captured) => {
                    captured.name = "target".to_string();
                    captured
                }
                None => SnapshotNode::reference("target", instance),
            };

            let position = links.children.len();
            links.push(SnapshotNode::group(
                position.to_string(),
                vec![
                    SnapshotNode::value("type", type_name),
                    SnapshotNode::value("kind", slot.kind.as_str()),
                    target,
                ],
            ));
        }
        links
    }

    /// Forward captured link state to the owned targets still linked.
    ///
    /// Entries for types that are no longer linked, borrowed links and
    /// reference entries are ignored.
    pub fn restore_links(&mut self, node: &SnapshotNode) {
        for entry in &node.children {
            let Some(type_name) = entry.child_value("type").and_then(|v| v.as_str()) else {
                continue;
            };
            let Some(target) = entry.child("target").filter(|t| t.kind != NodeKind::Reference)
            else {
                continue;
            };
            let Some(slot) = self.find_slot_by_name(type_name) else {
                continue;
            };
            match self.slots[slot].held.as_mut() {
                Some(Held::Boxed(component)) => component.restore(target),
                Some(Held::Strong(shared)) => {
                    if let Ok(mut guard) = shared.try_lock() {
                        guard.restore(target);
                    }
                }
                _ => {}
            }
        }
    }
}

impl Reflect for Composite {
    fn capture(&self) -> SnapshotNode {
        self.capture_links()
    }

    fn restore(&mut self, node: &SnapshotNode) {
        self.restore_links(node);
    }
}

/// Copies start empty: links are never duplicated implicitly.
impl Clone for Composite {
    fn clone(&self) -> Self {
        Self::with_capacity(Arc::clone(&self.catalog), self.capacity_hint)
    }
}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("slots", &self.slots.len())
            .field("links", &self.links().collect::<Vec<_>>())
            .finish()
    }
}

fn describe(shared: &Mutex<dyn Component>) -> Result<(String, InstanceId), LinkError> {
    try_visit(shared, |c| (c.type_name().to_string(), c.instance_id())).ok_or(LinkError::TargetBusy)
}

fn try_visit<R>(shared: &Mutex<dyn Component>, f: impl FnOnce(&dyn Component) -> R) -> Option<R> {
    match shared.try_lock() {
        Ok(guard) => Some(f(&*guard)),
        Err(TryLockError::Poisoned(poisoned)) => Some(f(&*poisoned.into_inner())),
        Err(TryLockError::WouldBlock) => None,
    }
}
