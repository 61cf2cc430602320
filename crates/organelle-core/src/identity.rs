//! Identifiable - objects that know what they are and which one they are.

use crate::types::InstanceId;

/// An object addressable through the registries.
///
/// `type_name` is resolved in the catalog's `type` namespace to obtain the
/// type identifier that composites index their links by. `instance_id`
/// distinguishes two objects of the same type.
pub trait Identifiable {
    /// Stable name of the runtime type, e.g. `"mitochondrion"`.
    fn type_name(&self) -> &str;

    /// Identity of this particular instance.
    fn instance_id(&self) -> InstanceId;
}
