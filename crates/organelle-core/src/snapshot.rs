//! Snapshot trees - a generic, self-describing picture of object state.
//!
//! Objects implementing [`Reflect`] describe whatever part of their state
//! they want to expose as a tree of [`SnapshotNode`]s. Transcoders turn
//! those trees into text and back without knowing anything about the
//! objects, and objects never know which format they end up in. The only
//! thing both sides share is the vocabulary of [`NodeKind`]s.

use crate::registry::IdentityRegistry;
use crate::types::{Identifier, InstanceId, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a snapshot node represents.
///
/// The set is open: domain layers register extra kinds in the
/// `state-kind` namespace and carry them as [`NodeKind::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A named scalar.
    Value,
    /// A named group of children (a record).
    StartGroup,
    /// Closes a group in flattened form.
    EndGroup,
    /// An ordered sequence of children.
    StartList,
    /// Closes a list in flattened form.
    EndList,
    /// A pointer to another object by instance id.
    Reference,
    /// A named operation with an argument.
    Operation,
    /// A domain-specific kind from the `state-kind` namespace.
    Custom(Identifier),
}

impl NodeKind {
    /// Look up (registering if needed) a custom kind by name.
    pub fn custom(state_kinds: &IdentityRegistry, name: &str) -> NodeKind {
        NodeKind::Custom(state_kinds.resolve(name))
    }

    /// Kinds that own children in tree form.
    pub fn is_composite(self) -> bool {
        matches!(self, NodeKind::StartGroup | NodeKind::StartList)
    }

    /// Markers that only exist in flattened form.
    pub fn is_end_marker(self) -> bool {
        matches!(self, NodeKind::EndGroup | NodeKind::EndList)
    }

    /// The end marker closing this kind, if it is composite.
    pub fn closing(self) -> Option<NodeKind> {
        match self {
            NodeKind::StartGroup => Some(NodeKind::EndGroup),
            NodeKind::StartList => Some(NodeKind::EndList),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Value => f.write_str("value"),
            NodeKind::StartGroup => f.write_str("group"),
            NodeKind::EndGroup => f.write_str("end-group"),
            NodeKind::StartList => f.write_str("list"),
            NodeKind::EndList => f.write_str("end-list"),
            NodeKind::Reference => f.write_str("reference"),
            NodeKind::Operation => f.write_str("operation"),
            NodeKind::Custom(id) => write!(f, "custom:{}", id),
        }
    }
}

impl FromStr for NodeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "value" => NodeKind::Value,
            "group" => NodeKind::StartGroup,
            "end-group" => NodeKind::EndGroup,
            "list" => NodeKind::StartList,
            "end-list" => NodeKind::EndList,
            "reference" => NodeKind::Reference,
            "operation" => NodeKind::Operation,
            other => {
                let raw = other.strip_prefix("custom:").ok_or(())?;
                let id = raw.parse::<u32>().map_err(|_| ())?;
                NodeKind::Custom(Identifier::new(id))
            }
        })
    }
}

/// One node of a snapshot tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    pub fn new(name: impl Into<String>, kind: NodeKind, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            children: Vec::new(),
        }
    }

    pub fn value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, NodeKind::Value, value.into())
    }

    pub fn group(name: impl Into<String>, children: Vec<SnapshotNode>) -> Self {
        Self {
            children,
            ..Self::new(name, NodeKind::StartGroup, Value::Null)
        }
    }

    pub fn list(name: impl Into<String>, children: Vec<SnapshotNode>) -> Self {
        Self {
            children,
            ..Self::new(name, NodeKind::StartList, Value::Null)
        }
    }

    /// A reference to another object instance.
    pub fn reference(name: impl Into<String>, target: InstanceId) -> Self {
        Self::new(name, NodeKind::Reference, Value::Text(target.to_string()))
    }

    pub fn operation(name: impl Into<String>, argument: impl Into<Value>) -> Self {
        Self::new(name, NodeKind::Operation, argument.into())
    }

    /// Append a child, builder style.
    pub fn with_child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: SnapshotNode) {
        self.children.push(child);
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&SnapshotNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Value of the first child with the given name.
    pub fn child_value(&self, name: &str) -> Option<&Value> {
        self.child(name).map(|c| &c.value)
    }

    /// Instance id carried by a reference node.
    pub fn referenced_instance(&self) -> Option<InstanceId> {
        if self.kind != NodeKind::Reference {
            return None;
        }
        self.value.as_str()?.parse().ok()
    }

    pub fn is_composite(&self) -> bool {
        self.kind.is_composite()
    }

    /// Total number of nodes in this tree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SnapshotNode::node_count).sum::<usize>()
    }

    /// Height of the tree; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(SnapshotNode::depth).max().unwrap_or(0)
    }

    /// Pre-order event form: composites become a childless start node,
    /// their flattened children, then a matching end marker.
    pub fn flatten(&self) -> Vec<SnapshotNode> {
        let mut events = Vec::with_capacity(self.node_count());
        self.flatten_into(&mut events);
        events
    }

    fn flatten_into(&self, events: &mut Vec<SnapshotNode>) {
        match self.kind.closing() {
            Some(end) => {
                events.push(SnapshotNode::new(self.name.clone(), self.kind, self.value.clone()));
                for child in &self.children {
                    child.flatten_into(events);
                }
                events.push(SnapshotNode::new(self.name.clone(), end, Value::Null));
            }
            None => events.push(SnapshotNode::new(self.name.clone(), self.kind, self.value.clone())),
        }
    }

    /// Rebuild a tree from [`flatten`](Self::flatten) output.
    ///
    /// Returns `None` for unbalanced or mismatched markers, or when the
    /// events do not describe exactly one root.
    pub fn unflatten(events: &[SnapshotNode]) -> Option<SnapshotNode> {
        let mut stack: Vec<SnapshotNode> = Vec::new();
        let mut root = None;

        for event in events {
            if root.is_some() {
                return None;
            }
            if event.kind.is_composite() {
                stack.push(SnapshotNode::new(event.name.clone(), event.kind, event.value.clone()));
                continue;
            }
            let finished = if event.kind.is_end_marker() {
                let open = stack.pop()?;
                if open.kind.closing() != Some(event.kind) {
                    return None;
                }
                open
            } else {
                SnapshotNode::new(event.name.clone(), event.kind, event.value.clone())
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(finished),
                None => root = Some(finished),
            }
        }

        if stack.is_empty() {
            root
        } else {
            None
        }
    }
}

/// Objects that can describe their state as a snapshot tree and be
/// restored from one.
pub trait Reflect {
    /// Capture the exposed state. Objects need not expose everything.
    fn capture(&self) -> SnapshotNode;

    /// Apply a previously captured tree. Children the object does not
    /// recognize are ignored.
    fn restore(&mut self, node: &SnapshotNode);
}
