//! JSON format, via `serde_json`.
//!
//! The document is an object with a single key, the root's name. Groups
//! become objects and lists become arrays; list entry names are not kept
//! and come back as their positions. Leaves that JSON has no scalar for
//! are tagged objects with one `$`-prefixed key:
//!
//! ```json
//! { "cell": { "energy": 42, "partner": { "$ref": "6f1c0f8e-..." }, "tag": { "$id": 3 } } }
//! ```

use crate::transcoder::{from_hex, to_hex, Path, Transcoder};
use organelle_core::snapshot::{NodeKind, SnapshotNode};
use organelle_core::types::{Identifier, InstanceId, Value};
use serde_json::{Map, Number, Value as Json};
use std::collections::HashSet;

const REF_KEY: &str = "$ref";
const OP_KEY: &str = "$op";
const BYTES_KEY: &str = "$bytes";
const ID_KEY: &str = "$id";

/// Transcoder for the JSON format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTranscoder {
    pretty: bool,
}

impl JsonTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output instead of a single line.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Transcoder for JsonTranscoder {
    fn name(&self) -> &str {
        "json"
    }

    fn decode(&self, text: &str) -> Option<SnapshotNode> {
        let document: Json = match serde_json::from_str(text) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(error = %e, "snapshot is not valid JSON");
                return None;
            }
        };
        let Json::Object(root) = document else {
            return None;
        };
        if root.len() != 1 {
            tracing::debug!(keys = root.len(), "JSON snapshot must have exactly one root key");
            return None;
        }
        let (name, value) = root.into_iter().next()?;
        from_json(name, value)
    }

    fn join_group(&self, _node: &SnapshotNode, _path: &Path, parts: Vec<(&str, String)>) -> Option<String> {
        let mut seen = HashSet::with_capacity(parts.len());
        let mut members = Vec::with_capacity(parts.len());
        for (name, part) in parts {
            // Tagged leaves own the `$` prefix; duplicate keys would be lost.
            if name.starts_with('$') || !seen.insert(name) {
                return None;
            }
            members.push(format!("{}:{}", Json::String(name.to_string()), part));
        }
        Some(format!("{{{}}}", members.join(",")))
    }

    fn join_list(&self, _node: &SnapshotNode, _path: &Path, parts: Vec<String>) -> Option<String> {
        Some(format!("[{}]", parts.join(",")))
    }

    fn encode_value(&self, node: &SnapshotNode, _path: &Path) -> Option<String> {
        to_json(&node.value).map(|json| json.to_string())
    }

    fn encode_reference(&self, node: &SnapshotNode, _path: &Path) -> Option<String> {
        let target = node.referenced_instance()?;
        Some(tagged(REF_KEY, Json::String(target.to_string())).to_string())
    }

    fn encode_operation(&self, node: &SnapshotNode, _path: &Path) -> Option<String> {
        Some(tagged(OP_KEY, to_json(&node.value)?).to_string())
    }

    fn finish(&self, root: &SnapshotNode, body: String) -> Option<String> {
        let document = format!("{{{}:{}}}", Json::String(root.name.clone()), body);
        if !self.pretty {
            return Some(document);
        }
        let value: Json = serde_json::from_str(&document).ok()?;
        serde_json::to_string_pretty(&value).ok()
    }
}

fn tagged(key: &str, value: Json) -> Json {
    let mut object = Map::with_capacity(1);
    object.insert(key.to_string(), value);
    Json::Object(object)
}

/// JSON form of a scalar. Non-finite floats have none.
fn to_json(value: &Value) -> Option<Json> {
    Some(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(f) => Json::Number(Number::from_f64(*f)?),
        Value::Text(text) => Json::String(text.clone()),
        Value::Bytes(bytes) => tagged(BYTES_KEY, Json::String(to_hex(bytes))),
        Value::Id(id) => tagged(ID_KEY, Json::Number(id.get().into())),
    })
}

fn scalar_from_json(value: Json) -> Option<Value> {
    match value {
        Json::Null => Some(Value::Null),
        Json::Bool(b) => Some(Value::Bool(b)),
        Json::Number(n) => n.as_i64().map(Value::Int).or_else(|| n.as_f64().map(Value::Float)),
        Json::String(text) => Some(Value::Text(text)),
        Json::Object(object) => match single_entry(object)? {
            (key, Json::String(hex)) if key == BYTES_KEY => from_hex(&hex).map(Value::Bytes),
            (key, Json::Number(n)) if key == ID_KEY => {
                let id = u32::try_from(n.as_u64()?).ok()?;
                Some(Value::Id(Identifier::new(id)))
            }
            _ => None,
        },
        Json::Array(_) => None,
    }
}

fn single_entry(object: Map<String, Json>) -> Option<(String, Json)> {
    if object.len() != 1 {
        return None;
    }
    object.into_iter().next()
}

fn is_tagged(object: &Map<String, Json>) -> bool {
    object.len() == 1 && object.keys().all(|key| key.starts_with('$'))
}

fn from_json(name: String, value: Json) -> Option<SnapshotNode> {
    match value {
        Json::Object(object) if is_tagged(&object) => {
            let (key, inner) = single_entry(object)?;
            match key.as_str() {
                REF_KEY => {
                    let instance: InstanceId = inner.as_str()?.parse().ok()?;
                    Some(SnapshotNode::reference(name, instance))
                }
                OP_KEY => Some(SnapshotNode::operation(name, scalar_from_json(inner)?)),
                _ => Some(SnapshotNode::value(name, scalar_from_json(tagged(&key, inner))?)),
            }
        }
        Json::Object(object) => {
            let children = object
                .into_iter()
                .map(|(key, child)| {
                    if key.starts_with('$') {
                        return None;
                    }
                    from_json(key, child)
                })
                .collect::<Option<Vec<_>>>()?;
            Some(SnapshotNode::group(name, children))
        }
        Json::Array(entries) => {
            let children = entries
                .into_iter()
                .enumerate()
                .map(|(index, entry)| from_json(index.to_string(), entry))
                .collect::<Option<Vec<_>>>()?;
            Some(SnapshotNode::list(name, children))
        }
        scalar => Some(SnapshotNode::new(name, NodeKind::Value, scalar_from_json(scalar)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcoder::ENCODE_FAILURE;

    #[test]
    fn root_is_a_single_key_object() {
        let json = JsonTranscoder::new();
        assert_eq!(json.encode(&SnapshotNode::value("n", 42)), r#"{"n":42}"#);

        let cell = SnapshotNode::group(
            "cell",
            vec![
                SnapshotNode::value("energy", 7),
                SnapshotNode::list("tags", vec![SnapshotNode::value("0", "motile")]),
            ],
        );
        assert_eq!(json.encode(&cell), r#"{"cell":{"energy":7,"tags":["motile"]}}"#);
    }

    #[test]
    fn child_order_survives_decoding() {
        let json = JsonTranscoder::new();
        let decoded = json
            .decode(r#"{"cell":{"zeta":1,"alpha":2,"mid":3}}"#)
            .unwrap();
        let names: Vec<&str> = decoded.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn tagged_leaves() {
        let json = JsonTranscoder::new();
        let target = InstanceId::from_seed(7);
        let node = SnapshotNode::group(
            "cell",
            vec![
                SnapshotNode::reference("partner", target),
                SnapshotNode::operation("divide", 2),
                SnapshotNode::value("genome", vec![0xde_u8, 0xad]),
                SnapshotNode::value("kind", Identifier::new(3)),
            ],
        );
        let text = json.encode(&node);
        assert!(text.contains(r#""partner":{"$ref":"#));
        assert!(text.contains(r#""divide":{"$op":2}"#));
        assert!(text.contains(r#""genome":{"$bytes":"dead"}"#));
        assert!(text.contains(r#""kind":{"$id":3}"#));
        assert_eq!(json.decode(&text), Some(node));
    }

    #[test]
    fn unrepresentable_groups_are_refused() {
        let json = JsonTranscoder::new();
        let duplicate = SnapshotNode::group(
            "cell",
            vec![SnapshotNode::value("a", 1), SnapshotNode::value("a", 2)],
        );
        assert_eq!(json.encode(&duplicate), ENCODE_FAILURE);

        let reserved = SnapshotNode::group("cell", vec![SnapshotNode::value("$ref", 1)]);
        assert_eq!(json.encode(&reserved), ENCODE_FAILURE);

        assert_eq!(json.encode(&SnapshotNode::value("x", f64::NAN)), ENCODE_FAILURE);
    }

    #[test]
    fn pretty_output_decodes_the_same() {
        let node = SnapshotNode::group(
            "cell",
            vec![SnapshotNode::value("energy", 1.5), SnapshotNode::value("alive", true)],
        );
        let pretty = JsonTranscoder::pretty().encode(&node);
        assert!(pretty.contains('\n'));
        assert_eq!(JsonTranscoder::new().decode(&pretty), Some(node));
    }

    #[test]
    fn malformed_documents_fail_to_decode() {
        let json = JsonTranscoder::new();
        assert_eq!(json.decode("not json"), None);
        assert_eq!(json.decode("[1, 2]"), None);
        assert_eq!(json.decode(r#"{"a":1,"b":2}"#), None);
        assert_eq!(json.decode(r#"{"a":{"$ref":"nope"}}"#), None);
        assert_eq!(json.decode(r#"{"a":{"$unknown":1}}"#), None);
    }
}
