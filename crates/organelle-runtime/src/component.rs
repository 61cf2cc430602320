//! Component - anything that can sit at either end of a link.
//!
//! A component is identifiable, declares capabilities, can describe its
//! state, and optionally carries a [`Composite`] of its own links. The
//! [`Component`] trait has a blanket implementation, so a type only
//! implements the four small traits it is made of.

use crate::composite::Composite;
use organelle_core::capability::Capable;
use organelle_core::effect::Effect;
use organelle_core::identity::Identifiable;
use organelle_core::snapshot::Reflect;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Link-holding behavior and effect hooks.
///
/// Every method has a default, so leaf objects that never hold links and
/// ignore effects implement it with an empty block.
pub trait Composable {
    /// The object's own links, if it holds any.
    fn composite(&self) -> Option<&Composite> {
        None
    }

    fn composite_mut(&mut self) -> Option<&mut Composite> {
        None
    }

    /// Called when an effect reaches this object. Return `false` on failure.
    fn on_apply(&mut self, effect: &dyn Effect) -> bool {
        let _ = effect;
        true
    }

    /// Called when an effect is reverted on this object.
    fn on_revert(&mut self, effect: &dyn Effect) -> bool {
        let _ = effect;
        true
    }
}

/// An object that can be linked into a composite.
pub trait Component: Identifiable + Capable + Composable + Reflect + Send + 'static {}

impl<T> Component for T where T: Identifiable + Capable + Composable + Reflect + Send + 'static {}

/// A component shared between holders.
pub type SharedComponent = Arc<Mutex<dyn Component>>;

/// A non-owning handle to a shared component.
pub type WeakComponent = Weak<Mutex<dyn Component>>;

/// Wrap a component for shared ownership.
pub fn share<T: Component>(component: T) -> SharedComponent {
    Arc::new(Mutex::new(component))
}

/// Lock a shared object, recovering the guard if a previous holder
/// panicked.
pub fn lock<T: ?Sized>(shared: &Mutex<T>) -> MutexGuard<'_, T> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run a whole sequence of operations under one lock.
///
/// Composites are not internally synchronized; callers sharing one across
/// threads hold the lock for the full sequence rather than per call.
pub fn with_lock<T: ?Sized, R>(shared: &Mutex<T>, f: impl FnOnce(&mut T) -> R) -> R {
    let mut guard = lock(shared);
    f(&mut guard)
}
