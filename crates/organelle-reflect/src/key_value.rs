//! Line-oriented `path=value` format.
//!
//! ```text
//! cell.energy=42
//! cell.label=mitochondrion
//! cell.links[0].target=@6f1c0f8e-3c1e-4c5d-9a8e-2d7f4b1a0c33
//! cell.spare={}
//! ```
//!
//! Scalars are written bare when that is unambiguous: `~` is null, then
//! booleans, integers and floats, and anything else is text. Text that
//! would read back as something else is written as a JSON string. A few
//! sigils mark the remaining leaves: `@` references, `!` operations,
//! `#x` bytes, `#id` identifiers. Empty composites are written `{}` and
//! `[]`. Lines starting with `#` are comments.

use crate::transcoder::{from_hex, to_hex, Path, Segment, Transcoder};
use organelle_core::snapshot::{NodeKind, SnapshotNode};
use organelle_core::types::{Identifier, InstanceId, Value};
use std::collections::BTreeMap;

/// Transcoder for the key-value format.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueTranscoder;

impl KeyValueTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// One `path=raw` line, if every name on the path can be written.
    fn line(path: &Path, raw: &str) -> Option<String> {
        if !path.names().all(is_writable_name) {
            return None;
        }
        Some(format!("{}={}", path, raw))
    }
}

impl Transcoder for KeyValueTranscoder {
    fn name(&self) -> &str {
        "kv"
    }

    fn decode(&self, text: &str) -> Option<SnapshotNode> {
        let mut top = Draft::Group(Vec::new());
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((path, raw)) = line.split_once('=') else {
                tracing::debug!(line, "key-value line without '='");
                return None;
            };
            let segments = parse_path(path)?;
            top.insert(&segments, parse_entry(raw)?)?;
        }

        let Draft::Group(mut roots) = top else {
            return None;
        };
        if roots.len() != 1 {
            tracing::debug!(roots = roots.len(), "key-value text must have exactly one root");
            return None;
        }
        let (name, root) = roots.pop()?;
        root.into_node(name)
    }

    fn join_group(&self, _node: &SnapshotNode, path: &Path, parts: Vec<(&str, String)>) -> Option<String> {
        if parts.is_empty() {
            return Self::line(path, "{}");
        }
        let lines: Vec<String> = parts.into_iter().map(|(_, lines)| lines).collect();
        Some(lines.join("\n"))
    }

    fn join_list(&self, _node: &SnapshotNode, path: &Path, parts: Vec<String>) -> Option<String> {
        if parts.is_empty() {
            return Self::line(path, "[]");
        }
        Some(parts.join("\n"))
    }

    fn encode_value(&self, node: &SnapshotNode, path: &Path) -> Option<String> {
        Self::line(path, &format_scalar(&node.value))
    }

    fn encode_reference(&self, node: &SnapshotNode, path: &Path) -> Option<String> {
        let target = node.referenced_instance()?;
        Self::line(path, &format!("@{}", target))
    }

    fn encode_operation(&self, node: &SnapshotNode, path: &Path) -> Option<String> {
        Self::line(path, &format!("!{}", format_scalar(&node.value)))
    }
}

fn is_writable_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('#')
        && name.trim() == name
        && !name.contains(['.', '[', ']', '=', '\n', '\r'])
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::Null => "~".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        // Debug keeps a decimal point on whole numbers.
        Value::Float(f) => format!("{:?}", f),
        Value::Text(text) if needs_quotes(text) => serde_json::Value::String(text.clone()).to_string(),
        Value::Text(text) => text.clone(),
        Value::Bytes(bytes) => format!("#x{}", to_hex(bytes)),
        Value::Id(id) => format!("#id{}", id.get()),
    }
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.trim() != text
        || text.starts_with(['"', '~', '#', '@', '!', '{', '['])
        || text.contains(['\n', '\r'])
        || text == "true"
        || text == "false"
        || text.parse::<i64>().is_ok()
        || text.parse::<f64>().is_ok()
}

fn parse_scalar(raw: &str) -> Option<Value> {
    if raw == "~" {
        return Some(Value::Null);
    }
    if raw.starts_with('"') {
        return serde_json::from_str::<String>(raw).ok().map(Value::Text);
    }
    if let Some(hex) = raw.strip_prefix("#x") {
        return from_hex(hex).map(Value::Bytes);
    }
    if let Some(id) = raw.strip_prefix("#id") {
        return id.parse::<u32>().ok().map(|id| Value::Id(Identifier::new(id)));
    }
    if raw.starts_with('#') {
        return None;
    }
    Some(match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(f) = raw.parse::<f64>() {
                Value::Float(f)
            } else {
                Value::Text(raw.to_string())
            }
        }
    })
}

/// Right-hand side of a line, before it is placed in the tree.
fn parse_entry(raw: &str) -> Option<Draft> {
    match raw {
        "{}" => return Some(Draft::Group(Vec::new())),
        "[]" => return Some(Draft::List(BTreeMap::new())),
        _ => {}
    }
    if let Some(target) = raw.strip_prefix('@') {
        let instance = target.parse::<InstanceId>().ok()?;
        return Some(Draft::Leaf(NodeKind::Reference, Value::Text(instance.to_string())));
    }
    if let Some(argument) = raw.strip_prefix('!') {
        return Some(Draft::Leaf(NodeKind::Operation, parse_scalar(argument)?));
    }
    Some(Draft::Leaf(NodeKind::Value, parse_scalar(raw)?))
}

fn parse_path(path: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = path;

    let end = rest.find(['.', '[']).unwrap_or(rest.len());
    segments.push(Segment::Name(name_segment(&rest[..end])?));
    rest = &rest[end..];

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            segments.push(Segment::Name(name_segment(&after[..end])?));
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']')?;
            segments.push(Segment::Index(after[..close].parse().ok()?));
            rest = &after[close + 1..];
        } else {
            return None;
        }
    }
    Some(segments)
}

fn name_segment(name: &str) -> Option<String> {
    if name.is_empty() || name.contains(']') {
        return None;
    }
    Some(name.to_string())
}

/// Partially decoded tree. Composites are created on demand by the
/// paths that pass through them.
#[derive(Debug)]
enum Draft {
    Vacant,
    Leaf(NodeKind, Value),
    Group(Vec<(String, Draft)>),
    List(BTreeMap<usize, Draft>),
}

impl Draft {
    fn insert(&mut self, path: &[Segment], entry: Draft) -> Option<()> {
        let Some((head, rest)) = path.split_first() else {
            return self.settle(entry);
        };
        if matches!(self, Draft::Vacant) {
            *self = match head {
                Segment::Name(_) => Draft::Group(Vec::new()),
                Segment::Index(_) => Draft::List(BTreeMap::new()),
            };
        }

        let child = match (self, head) {
            (Draft::Group(children), Segment::Name(name)) => {
                let position = match children.iter().position(|(n, _)| n == name) {
                    Some(position) => position,
                    None => {
                        children.push((name.clone(), Draft::Vacant));
                        children.len() - 1
                    }
                };
                &mut children[position].1
            }
            (Draft::List(entries), Segment::Index(index)) => entries.entry(*index).or_insert(Draft::Vacant),
            _ => return None,
        };
        child.insert(rest, entry)
    }

    /// Put a decoded entry where the path ended.
    fn settle(&mut self, entry: Draft) -> Option<()> {
        if matches!(self, Draft::Vacant) {
            *self = entry;
            return Some(());
        }
        // `{}` / `[]` next to lines that already created the composite.
        let redundant_marker = match (&*self, &entry) {
            (Draft::Group(_), Draft::Group(marker)) => marker.is_empty(),
            (Draft::List(_), Draft::List(marker)) => marker.is_empty(),
            _ => false,
        };
        if !redundant_marker {
            tracing::debug!("key-value path assigned twice");
            return None;
        }
        Some(())
    }

    fn into_node(self, name: String) -> Option<SnapshotNode> {
        match self {
            Draft::Vacant => None,
            Draft::Leaf(kind, value) => Some(SnapshotNode::new(name, kind, value)),
            Draft::Group(children) => {
                let children = children
                    .into_iter()
                    .map(|(child_name, child)| child.into_node(child_name))
                    .collect::<Option<Vec<_>>>()?;
                Some(SnapshotNode::group(name, children))
            }
            Draft::List(entries) => {
                // Indices must be exactly 0..n.
                if entries.keys().enumerate().any(|(position, index)| position != *index) {
                    tracing::debug!(list = %name, "key-value list has gaps");
                    return None;
                }
                let children = entries
                    .into_values()
                    .enumerate()
                    .map(|(index, entry)| entry.into_node(index.to_string()))
                    .collect::<Option<Vec<_>>>()?;
                Some(SnapshotNode::list(name, children))
            }
        }
    }
}
