//! Error types for Organelle operations.
//!
//! Nothing in the core is fatal: failed lookups return the invalid
//! identifier or `None`, and the operations that can be refused return one
//! of the small error enums below.

use crate::types::Identifier;
use thiserror::Error;

/// Result type for Organelle operations.
pub type Result<T> = std::result::Result<T, OrganelleError>;

/// Why a link request was refused. The composite is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Null target, unusable ownership kind, or a kind/target mismatch.
    #[error("invalid link argument: {0}")]
    InvalidArgument(&'static str),
    /// The target's type name resolved to the invalid identifier.
    #[error("target type has no valid identifier")]
    InvalidIdentifier,
    /// An active link of this type already exists.
    #[error("type {0} is already linked")]
    AlreadyLinked(Identifier),
    /// A shared target was locked elsewhere while linking.
    #[error("target is locked by another holder")]
    TargetBusy,
}

/// Propagation visited at least one target that failed.
///
/// Which target failed is not carried here; it is logged at the point of
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PropagationError {
    #[error("effect propagation failed on one or more linked objects")]
    Failed,
}

/// Umbrella error for callers that want a single error type.
#[derive(Debug, Error)]
pub enum OrganelleError {
    #[error("link error: {0}")]
    Link(#[from] LinkError),
    #[error("propagation error: {0}")]
    Propagation(#[from] PropagationError),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed for node '{0}'")]
    Encode(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrganelleError {
    pub fn decode(reason: impl Into<String>) -> Self {
        OrganelleError::Decode(reason.into())
    }

    pub fn encode(node_name: impl Into<String>) -> Self {
        OrganelleError::Encode(node_name.into())
    }
}
