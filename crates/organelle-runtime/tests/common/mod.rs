//! Fixtures shared by the runtime scenario tests.

#![allow(dead_code)]

use organelle_core::capability::{Capable, CapabilitySet};
use organelle_core::catalog::Catalog;
use organelle_core::effect::Effect;
use organelle_core::identity::Identifiable;
use organelle_core::snapshot::{Reflect, SnapshotNode};
use organelle_core::types::InstanceId;
use organelle_runtime::component::Composable;
use organelle_runtime::composite::Composite;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A linkable test cell that counts its drops and the effects it sees.
pub struct Cell {
    pub id: InstanceId,
    pub kind: &'static str,
    pub caps: &'static [&'static str],
    pub composite: Composite,
    pub energy: i64,
    pub applied: u32,
    pub reverted: u32,
    pub seen_effects: Vec<String>,
    pub fail: bool,
    pub drops: Arc<AtomicUsize>,
}

impl Cell {
    pub fn new(catalog: &Arc<Catalog>, kind: &'static str, caps: &'static [&'static str]) -> Self {
        Self {
            id: InstanceId::new(),
            kind,
            caps,
            composite: Composite::new(Arc::clone(catalog)),
            energy: 0,
            applied: 0,
            reverted: 0,
            seen_effects: Vec::new(),
            fail: false,
            drops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn with_energy(mut self, energy: i64) -> Self {
        self.energy = energy;
        self
    }

    pub fn drop_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.drops)
    }

    pub fn into_shared(self) -> Arc<Mutex<Cell>> {
        Arc::new(Mutex::new(self))
    }
}

impl Drop for Cell {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl Identifiable for Cell {
    fn type_name(&self) -> &str {
        self.kind
    }

    fn instance_id(&self) -> InstanceId {
        self.id
    }
}

impl Capable for Cell {
    fn declared_capabilities(&self) -> &[&'static str] {
        self.caps
    }
}

impl Composable for Cell {
    fn composite(&self) -> Option<&Composite> {
        Some(&self.composite)
    }

    fn composite_mut(&mut self) -> Option<&mut Composite> {
        Some(&mut self.composite)
    }

    fn on_apply(&mut self, effect: &dyn Effect) -> bool {
        self.applied += 1;
        self.seen_effects.push(effect.type_name().to_string());
        !self.fail
    }

    fn on_revert(&mut self, _effect: &dyn Effect) -> bool {
        self.reverted += 1;
        !self.fail
    }
}

impl Reflect for Cell {
    fn capture(&self) -> SnapshotNode {
        SnapshotNode::group(
            self.kind,
            vec![
                SnapshotNode::value("energy", self.energy),
                self.composite.capture_links(),
            ],
        )
    }

    fn restore(&mut self, node: &SnapshotNode) {
        if let Some(energy) = node.child_value("energy").and_then(|v| v.as_i64()) {
            self.energy = energy;
        }
        if let Some(links) = node.child("links") {
            self.composite.restore_links(links);
        }
    }
}

/// A test effect carrying fixed capability tags.
pub struct Toxin {
    pub id: InstanceId,
    pub caps: &'static [&'static str],
}

impl Toxin {
    pub fn new(caps: &'static [&'static str]) -> Self {
        Self {
            id: InstanceId::new(),
            caps,
        }
    }
}

impl Identifiable for Toxin {
    fn type_name(&self) -> &str {
        "toxin"
    }

    fn instance_id(&self) -> InstanceId {
        self.id
    }
}

impl Capable for Toxin {
    fn declared_capabilities(&self) -> &[&'static str] {
        self.caps
    }
}

impl Effect for Toxin {}

/// An effect that wraps another one.
pub struct Amplified<'a> {
    pub inner: &'a dyn Effect,
}

impl Identifiable for Amplified<'_> {
    fn type_name(&self) -> &str {
        "amplified"
    }

    fn instance_id(&self) -> InstanceId {
        InstanceId::from_seed(404)
    }
}

impl Capable for Amplified<'_> {
    fn capability_override(&self) -> Option<CapabilitySet> {
        Some(CapabilitySet::new())
    }
}

impl Effect for Amplified<'_> {
    fn base(&self) -> Option<&dyn Effect> {
        Some(self.inner)
    }
}
