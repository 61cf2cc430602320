//! Shared types used across all Organelle crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// An opaque identifier, scoped to one namespace of an identity registry.
///
/// Identifiers are handed out densely starting at 1. Zero is the universal
/// "invalid" sentinel and is never assigned to a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(u32);

impl Identifier {
    /// The invalid sentinel.
    pub const INVALID: Identifier = Identifier(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Identifier> for u32 {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// Unique identity of one object instance.
///
/// Type identifiers say *what* an object is; instance ids tell two objects
/// of the same type apart (cycle guarding, snapshot references).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic id for tests and reproducible fixtures.
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&seed.to_le_bytes());
        bytes[8..].copy_from_slice(&seed.rotate_left(17).to_be_bytes());
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// How a composite holds one of its linked objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnershipKind {
    /// The holder is the sole owner and destroys the target when the link
    /// breaks or the holder itself is dropped.
    Owned,
    /// The target lives elsewhere; the holder never destroys it.
    Borrowed,
    /// Borrowed, and expected to be unlinked soon.
    Transient,
    /// Slot is free for reuse.
    Empty,
    /// Link kind could not be determined. Currently handled like `Owned`.
    Unrecognized,
}

impl OwnershipKind {
    /// All kinds, in declaration order.
    pub const ALL: [OwnershipKind; 5] = [
        OwnershipKind::Owned,
        OwnershipKind::Borrowed,
        OwnershipKind::Transient,
        OwnershipKind::Empty,
        OwnershipKind::Unrecognized,
    ];

    /// Whether breaking a link of this kind destroys the target.
    pub fn destroys_target(self) -> bool {
        matches!(self, OwnershipKind::Owned | OwnershipKind::Unrecognized)
    }

    /// Whether the holder keeps a non-owning handle.
    pub fn is_borrowed(self) -> bool {
        matches!(self, OwnershipKind::Borrowed | OwnershipKind::Transient)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OwnershipKind::Owned => "owned",
            OwnershipKind::Borrowed => "borrowed",
            OwnershipKind::Transient => "transient",
            OwnershipKind::Empty => "empty",
            OwnershipKind::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for OwnershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnershipKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OwnershipKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// A tagged scalar value.
///
/// Backs snapshot node payloads. Supports typed storage, typed retrieval
/// and equality.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Id(Identifier),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats and integers both read as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<Identifier> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// Short name of the stored type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Id(_) => "id",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Identifier> for Value {
    fn from(v: Identifier) -> Self {
        Value::Id(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_the_invalid_identifier() {
        assert!(!Identifier::INVALID.is_valid());
        assert!(!Identifier::default().is_valid());
        assert!(Identifier::new(1).is_valid());
    }

    #[test]
    fn seeded_instance_ids_are_deterministic() {
        assert_eq!(InstanceId::from_seed(7), InstanceId::from_seed(7));
        assert_ne!(InstanceId::from_seed(7), InstanceId::from_seed(8));
    }

    #[test]
    fn ownership_kind_parses_its_own_names() {
        for kind in OwnershipKind::ALL {
            assert_eq!(kind.as_str().parse::<OwnershipKind>(), Ok(kind));
        }
        assert!("sideways".parse::<OwnershipKind>().is_err());
    }

    #[test]
    fn unrecognized_behaves_like_owned() {
        assert!(OwnershipKind::Owned.destroys_target());
        assert!(OwnershipKind::Unrecognized.destroys_target());
        assert!(!OwnershipKind::Borrowed.destroys_target());
        assert!(!OwnershipKind::Transient.destroys_target());
        assert!(OwnershipKind::Transient.is_borrowed());
    }

    #[test]
    fn value_accessors_are_typed() {
        let v = Value::from(42);
        assert_eq!(v.as_i64(), Some(42));
        assert_eq!(v.as_f64(), Some(42.0));
        assert_eq!(v.as_str(), None);
        assert_eq!(Value::from("cell").as_str(), Some("cell"));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Identifier::new(3)).as_id(), Some(Identifier::new(3)));
    }
}
