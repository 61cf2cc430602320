//! The transcoder contract.
//!
//! A transcoder turns a snapshot tree into text and back. Encoding is a
//! generic recursive descent shared by every format: groups and lists are
//! walked here, and each format only says how to render a leaf and how to
//! join the rendered children of a composite. Any step can refuse a node,
//! which makes the whole encode return [`ENCODE_FAILURE`].
//!
//! Decoding has no shared structure and is left entirely to the format.

use organelle_core::error::{OrganelleError, Result};
use organelle_core::snapshot::{NodeKind, SnapshotNode};
use organelle_core::types::Identifier;
use std::fmt;

/// Returned by [`Transcoder::encode`] when some node has no representation
/// in the target format.
pub const ENCODE_FAILURE: &str = "#unencodable";

/// One step of the path from the root to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A named child of a group (or the root).
    Name(String),
    /// A list entry, by position.
    Index(usize),
}

/// Location of a node in the tree being encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn root(name: &str) -> Self {
        Self {
            segments: vec![Segment::Name(name.to_string())],
        }
    }

    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of composites above this node; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Names along the path, skipping list positions.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Name(name) => Some(name.as_str()),
            Segment::Index(_) => None,
        })
    }
}

/// Dotted form: `cell.links[0].type`.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Name(name) if i == 0 => f.write_str(name)?,
                Segment::Name(name) => write!(f, ".{}", name)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A text format for snapshot trees.
pub trait Transcoder: Send + Sync {
    /// Short format name, as used on the command line.
    fn name(&self) -> &str;

    /// Render a whole tree, or [`ENCODE_FAILURE`] if any node is refused.
    fn encode(&self, root: &SnapshotNode) -> String {
        let path = Path::root(&root.name);
        match self
            .encode_node(root, &path)
            .and_then(|body| self.finish(root, body))
        {
            Some(text) => text,
            None => {
                tracing::debug!(transcoder = self.name(), root = %root.name, "snapshot is not encodable");
                ENCODE_FAILURE.to_string()
            }
        }
    }

    /// Parse text produced by this format. `None` on any malformed input.
    fn decode(&self, text: &str) -> Option<SnapshotNode>;

    /// Recursive step of [`encode`](Transcoder::encode).
    fn encode_node(&self, node: &SnapshotNode, path: &Path) -> Option<String> {
        match node.kind {
            NodeKind::StartGroup => {
                let mut parts = Vec::with_capacity(node.children.len());
                for child in &node.children {
                    let child_path = path.child(Segment::Name(child.name.clone()));
                    parts.push((child.name.as_str(), self.encode_node(child, &child_path)?));
                }
                self.join_group(node, path, parts)
            }
            NodeKind::StartList => {
                let mut parts = Vec::with_capacity(node.children.len());
                for (index, child) in node.children.iter().enumerate() {
                    let child_path = path.child(Segment::Index(index));
                    parts.push(self.encode_node(child, &child_path)?);
                }
                self.join_list(node, path, parts)
            }
            NodeKind::Value => self.encode_value(node, path),
            NodeKind::Reference => self.encode_reference(node, path),
            NodeKind::Operation => self.encode_operation(node, path),
            NodeKind::Custom(kind) => self.encode_custom(node, kind, path),
            // End markers only exist in flattened form.
            NodeKind::EndGroup | NodeKind::EndList => None,
        }
    }

    /// Combine the rendered children of a group, in order, with their names.
    fn join_group(&self, node: &SnapshotNode, path: &Path, parts: Vec<(&str, String)>) -> Option<String>;

    /// Combine the rendered entries of a list, in order.
    fn join_list(&self, node: &SnapshotNode, path: &Path, parts: Vec<String>) -> Option<String>;

    fn encode_value(&self, node: &SnapshotNode, path: &Path) -> Option<String>;

    fn encode_reference(&self, _node: &SnapshotNode, _path: &Path) -> Option<String> {
        None
    }

    fn encode_operation(&self, _node: &SnapshotNode, _path: &Path) -> Option<String> {
        None
    }

    /// Domain kinds are refused unless a format knows them.
    fn encode_custom(&self, _node: &SnapshotNode, _kind: Identifier, _path: &Path) -> Option<String> {
        None
    }

    /// Last touch on the rendered root, e.g. wrapping or pretty printing.
    fn finish(&self, _root: &SnapshotNode, body: String) -> Option<String> {
        Some(body)
    }
}

/// [`Transcoder::encode`] with the sentinel turned into an error.
pub fn encode_checked<T: Transcoder + ?Sized>(transcoder: &T, root: &SnapshotNode) -> Result<String> {
    let text = transcoder.encode(root);
    if text == ENCODE_FAILURE {
        return Err(OrganelleError::encode(root.name.clone()));
    }
    Ok(text)
}

/// [`Transcoder::decode`] with `None` turned into an error.
pub fn decode_checked<T: Transcoder + ?Sized>(transcoder: &T, text: &str) -> Result<SnapshotNode> {
    transcoder.decode(text).ok_or_else(|| {
        OrganelleError::decode(format!("input is not a valid {} snapshot", transcoder.name()))
    })
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    use fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

pub(crate) fn from_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}
