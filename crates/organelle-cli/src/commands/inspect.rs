//! Print a snapshot tree and its node statistics.

use anyhow::Result;
use colored::Colorize;
use organelle::prelude::{Format, NodeKind, SnapshotNode, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::{read_snapshot, resolve_format};
use crate::config::Config;

/// Node statistics for one snapshot tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub depth: usize,
    pub references: usize,
    pub by_kind: BTreeMap<String, usize>,
}

impl TreeStats {
    pub fn of(root: &SnapshotNode) -> Self {
        let mut stats = Self {
            nodes: root.node_count(),
            depth: root.depth(),
            references: 0,
            by_kind: BTreeMap::new(),
        };
        stats.count(root);
        stats
    }

    fn count(&mut self, node: &SnapshotNode) {
        *self.by_kind.entry(node.kind.to_string()).or_insert(0) += 1;
        if node.kind == NodeKind::Reference {
            self.references += 1;
        }
        for child in &node.children {
            self.count(child);
        }
    }
}

pub fn run(config: &Config, file: &str, format: Option<Format>) -> Result<()> {
    let path = Path::new(file);
    let format = resolve_format(format, path, config);
    let root = read_snapshot(path, format)?;

    println!("{} {} ({})", "Snapshot".white().bold(), file.cyan(), format);
    println!("{}", "═".repeat(40).dimmed());
    print!("{}", render_tree(&root));
    println!();

    let stats = TreeStats::of(&root);
    println!("{}", "Statistics".blue().bold());
    println!("  Nodes:             {}", stats.nodes.to_string().cyan());
    println!("  Depth:             {}", stats.depth.to_string().cyan());
    println!("  References:        {}", stats.references.to_string().cyan());
    for (kind, count) in &stats.by_kind {
        println!("  {:<18} {}", format!("{}:", kind), count);
    }
    println!("{}", "═".repeat(40).dimmed());
    Ok(())
}

/// Indented, kind-annotated rendering; one node per line.
pub fn render_tree(root: &SnapshotNode) -> String {
    let mut out = String::new();
    render_into(root, 0, &mut out);
    out
}

fn render_into(node: &SnapshotNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let line = match node.kind {
        NodeKind::StartGroup | NodeKind::StartList => {
            format!("{}{} ({}, {} children)", indent, node.name, node.kind, node.children.len())
        }
        NodeKind::Reference => format!("{}{} ({}) -> {}", indent, node.name, node.kind, display_value(&node.value)),
        _ => format!("{}{} ({}) = {}", indent, node.name, node.kind, display_value(&node.value)),
    };
    out.push_str(&line);
    out.push('\n');
    for child in &node.children {
        render_into(child, depth + 1, out);
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(text) => format!("{:?}", text),
        Value::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        Value::Id(id) => format!("#{}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use organelle::prelude::InstanceId;

    fn sample() -> SnapshotNode {
        SnapshotNode::group(
            "cell",
            vec![
                SnapshotNode::value("energy", 42),
                SnapshotNode::list(
                    "links",
                    vec![SnapshotNode::group(
                        "0",
                        vec![
                            SnapshotNode::value("type", "ribosome"),
                            SnapshotNode::reference("target", InstanceId::from_seed(1)),
                        ],
                    )],
                ),
            ],
        )
    }

    #[test]
    fn tree_is_indented_by_depth() {
        let rendered = render_tree(&sample());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "cell (group, 2 children)");
        assert_eq!(lines[1], "  energy (value) = 42");
        assert_eq!(lines[2], "  links (list, 1 children)");
        assert_eq!(lines[4], "      type (value) = \"ribosome\"");
        assert!(lines[5].starts_with("      target (reference) -> "));
    }

    #[test]
    fn stats_count_every_kind() {
        let stats = TreeStats::of(&sample());
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.depth, 4);
        assert_eq!(stats.references, 1);
        assert_eq!(stats.by_kind.get("value"), Some(&2));
        assert_eq!(stats.by_kind.get("group"), Some(&2));
        assert_eq!(stats.by_kind.get("list"), Some(&1));
    }
}
