//! Effect propagation - spreading a change across the link graph.
//!
//! Applying an effect to an object runs the object's own hook, then walks
//! its links depth-first and recurses into every linked object whose
//! capabilities match the effect's. The walk is best-effort: a failing
//! target does not stop the walk, it only turns the overall result into
//! [`PropagationError::Failed`].
//!
//! Two guards keep the walk finite on cyclic graphs:
//!
//! - the canonical effect's own instance is marked in progress, so a link
//!   that leads back to the effect itself is skipped;
//! - every object is visited at most once per top-level call, so
//!   convergent paths and back-edges reach each target once.
//!
//! Recursion runs on the caller's stack. Very deep link graphs can exhaust
//! it; nothing here bounds the depth.

use crate::component::{Component, Composable};
use crate::composite::{Composite, Held};
use organelle_core::capability::CapabilitySet;
use organelle_core::catalog::Catalog;
use organelle_core::effect::{canonical, Effect};
use organelle_core::error::PropagationError;
use organelle_core::identity::Identifiable;
use organelle_core::types::InstanceId;
use std::collections::HashSet;
use std::sync::{Mutex, TryLockError};

/// Which hook a walk invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Revert,
}

/// Apply `effect` to `node` and everything compatible linked below it.
pub fn apply_effect<C>(node: &mut C, effect: &dyn Effect) -> Result<(), PropagationError>
where
    C: Composable + Identifiable + ?Sized,
{
    propagate(node, effect, Direction::Apply)
}

/// Revert `effect` from `node` and everything compatible linked below it.
pub fn revert_effect<C>(node: &mut C, effect: &dyn Effect) -> Result<(), PropagationError>
where
    C: Composable + Identifiable + ?Sized,
{
    propagate(node, effect, Direction::Revert)
}

/// Shared implementation of [`apply_effect`] and [`revert_effect`].
pub fn propagate<C>(
    node: &mut C,
    effect: &dyn Effect,
    direction: Direction,
) -> Result<(), PropagationError>
where
    C: Composable + Identifiable + ?Sized,
{
    let effect = canonical(effect);
    let mut walk = Walk::new(effect, direction);
    walk.visited.insert(node.instance_id());

    if walk.visit(node) {
        Ok(())
    } else {
        Err(PropagationError::Failed)
    }
}

/// State of one top-level propagation call.
pub(crate) struct Walk<'e> {
    effect: &'e dyn Effect,
    direction: Direction,
    effect_caps: Option<CapabilitySet>,
    in_progress: HashSet<InstanceId>,
    visited: HashSet<InstanceId>,
}

impl<'e> Walk<'e> {
    fn new(effect: &'e dyn Effect, direction: Direction) -> Self {
        let mut in_progress = HashSet::new();
        in_progress.insert(effect.instance_id());
        Self {
            effect,
            direction,
            effect_caps: None,
            in_progress,
            visited: HashSet::new(),
        }
    }

    /// Run the hook on `node`, then walk its links.
    fn visit<C>(&mut self, node: &mut C) -> bool
    where
        C: Composable + Identifiable + ?Sized,
    {
        tracing::trace!(
            target_type = node.type_name(),
            instance = %node.instance_id(),
            direction = ?self.direction,
            "effect visit"
        );
        let hooked = match self.direction {
            Direction::Apply => node.on_apply(self.effect),
            Direction::Revert => node.on_revert(self.effect),
        };
        if !hooked {
            tracing::warn!(
                target_type = node.type_name(),
                instance = %node.instance_id(),
                effect = self.effect.type_name(),
                direction = ?self.direction,
                "effect hook failed"
            );
        }

        let mut ok = hooked;
        if let Some(composite) = node.composite_mut() {
            ok &= composite.propagate(self);
        }
        ok
    }

    fn effect_caps(&mut self, catalog: &Catalog) -> CapabilitySet {
        let effect = self.effect;
        self.effect_caps
            .get_or_insert_with(|| catalog.capabilities_of(effect))
            .clone()
    }

    /// Recurse into a linked target if its capabilities match.
    fn enter(&mut self, catalog: &Catalog, effect_caps: &CapabilitySet, target: &mut dyn Component) -> bool {
        if !catalog.capabilities_of(target).intersects(effect_caps) {
            return true;
        }
        self.visit(target)
    }

    fn enter_shared(
        &mut self,
        catalog: &Catalog,
        effect_caps: &CapabilitySet,
        target: &Mutex<dyn Component>,
    ) -> bool {
        match target.try_lock() {
            Ok(mut guard) => self.enter(catalog, effect_caps, &mut *guard),
            Err(TryLockError::WouldBlock) => {
                tracing::warn!(effect = self.effect.type_name(), "linked object is locked elsewhere");
                false
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                tracing::debug!(effect = self.effect.type_name(), "recovering poisoned linked object");
                self.enter(catalog, effect_caps, &mut *poisoned.into_inner())
            }
        }
    }
}

impl Composite {
    /// Walk every active slot once, recursing into eligible targets.
    pub(crate) fn propagate(&mut self, walk: &mut Walk<'_>) -> bool {
        let catalog = std::sync::Arc::clone(self.catalog());
        let effect_caps = walk.effect_caps(&catalog);
        let mut ok = true;

        for slot in self.slots.iter_mut().filter(|s| s.is_active()) {
            let Some(instance) = slot.instance else {
                continue;
            };
            if walk.in_progress.contains(&instance) {
                tracing::trace!(%instance, "skipping link back to the effect in progress");
                continue;
            }
            if !walk.visited.insert(instance) {
                continue;
            }

            match slot.held.as_mut() {
                Some(Held::Boxed(component)) => {
                    ok &= walk.enter(&catalog, &effect_caps, component.as_mut());
                }
                Some(Held::Strong(shared)) => {
                    ok &= walk.enter_shared(&catalog, &effect_caps, shared);
                }
                Some(Held::Weak(weak)) => match weak.upgrade() {
                    Some(shared) => ok &= walk.enter_shared(&catalog, &effect_caps, &shared),
                    None => tracing::trace!(%instance, "borrowed target no longer exists"),
                },
                None => {}
            }
        }
        ok
    }
}
