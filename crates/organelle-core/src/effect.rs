//! Effects - cross-cutting changes that spread along composition links.
//!
//! An effect is itself identifiable and capable: its capability tags decide
//! which linked objects it can reach, and its instance id lets propagation
//! notice when the walk loops back onto the effect itself. Wrapper effects
//! (a scaled or delayed variant, say) point at the effect they decorate
//! through [`Effect::base`]; propagation always works on the innermost one.

use crate::capability::Capable;
use crate::identity::Identifiable;

/// A cross-cutting effect that can be applied to and reverted from a link
/// graph.
pub trait Effect: Identifiable + Capable {
    /// The effect this one wraps, if any.
    fn base(&self) -> Option<&dyn Effect> {
        None
    }
}

/// Reduce an effect to its canonical form by following [`Effect::base`].
pub fn canonical(effect: &dyn Effect) -> &dyn Effect {
    let mut current = effect;
    while let Some(base) = current.base() {
        current = base;
    }
    current
}
