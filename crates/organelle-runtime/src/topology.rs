//! Link graph introspection.
//!
//! Builds a petgraph view of everything reachable from one component: a
//! node per object instance, a directed edge per link labelled with its
//! ownership kind. Handy for diagnosing cycles before propagating effects
//! and for dumping the structure of a composition.

use crate::component::Component;
use crate::composite::Held;
use organelle_core::identity::Identifiable;
use organelle_core::types::{InstanceId, OwnershipKind};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::TryLockError;

/// One object in the link graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkNode {
    pub instance: InstanceId,
    pub type_name: String,
}

/// One link, as exported by [`LinkGraph::edges`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEdge {
    pub from: InstanceId,
    pub to: InstanceId,
    pub kind: OwnershipKind,
}

/// Directed graph of the links reachable from a root component.
pub struct LinkGraph {
    graph: DiGraph<LinkNode, OwnershipKind>,
    index: HashMap<InstanceId, NodeIndex>,
    root: NodeIndex,
}

impl LinkGraph {
    /// Walk the links below `root`.
    ///
    /// Borrowed targets that no longer exist are left out. Shared targets
    /// locked elsewhere appear as nodes with an empty type name and are not
    /// expanded.
    pub fn from_root<C: Component + ?Sized>(root: &C) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        let root_index = graph.add_node(LinkNode {
            instance: root.instance_id(),
            type_name: root.type_name().to_string(),
        });
        index.insert(root.instance_id(), root_index);

        let mut builder = Builder {
            graph,
            index,
        };
        builder.expand(root, root_index);

        Self {
            graph: builder.graph,
            index: builder.index,
            root: root_index,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether some link path leads back to where it started.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Number of objects reachable from the root, the root included.
    pub fn reachable_from_root(&self) -> usize {
        let mut dfs = Dfs::new(&self.graph, self.root);
        let mut count = 0;
        while dfs.next(&self.graph).is_some() {
            count += 1;
        }
        count
    }

    pub fn node(&self, instance: InstanceId) -> Option<&LinkNode> {
        self.index.get(&instance).map(|idx| &self.graph[*idx])
    }

    pub fn nodes(&self) -> Vec<&LinkNode> {
        self.graph.node_weights().collect()
    }

    pub fn edges(&self) -> Vec<LinkEdge> {
        self.graph
            .edge_references()
            .map(|edge| LinkEdge {
                from: self.graph[edge.source()].instance,
                to: self.graph[edge.target()].instance,
                kind: *edge.weight(),
            })
            .collect()
    }

    /// JSON dump of nodes and edges.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "root": self.graph[self.root].instance,
            "nodes": self.nodes(),
            "edges": self.edges(),
        })
    }
}

struct Builder {
    graph: DiGraph<LinkNode, OwnershipKind>,
    index: HashMap<InstanceId, NodeIndex>,
}

impl Builder {
    fn expand<C: Component + ?Sized>(&mut self, node: &C, at: NodeIndex) {
        let Some(composite) = node.composite() else {
            return;
        };
        for slot in composite.slots.iter().filter(|s| s.is_active()) {
            let Some(instance) = slot.instance else {
                continue;
            };

            if let Some(&existing) = self.index.get(&instance) {
                self.graph.add_edge(at, existing, slot.kind);
                continue;
            }

            match slot.held.as_ref() {
                Some(Held::Boxed(component)) => {
                    let child = self.add(component.as_ref());
                    self.graph.add_edge(at, child, slot.kind);
                    self.expand(component.as_ref(), child);
                }
                Some(Held::Strong(shared)) => self.expand_shared(at, instance, slot.kind, shared),
                Some(Held::Weak(weak)) => {
                    if let Some(shared) = weak.upgrade() {
                        self.expand_shared(at, instance, slot.kind, &shared);
                    }
                }
                None => {}
            }
        }
    }

    fn expand_shared(
        &mut self,
        at: NodeIndex,
        instance: InstanceId,
        kind: OwnershipKind,
        shared: &std::sync::Mutex<dyn Component>,
    ) {
        match shared.try_lock() {
            Ok(guard) => {
                let child = self.add(&*guard);
                self.graph.add_edge(at, child, kind);
                self.expand(&*guard, child);
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                let guard = poisoned.into_inner();
                let child = self.add(&*guard);
                self.graph.add_edge(at, child, kind);
                self.expand(&*guard, child);
            }
            Err(TryLockError::WouldBlock) => {
                let child = self.graph.add_node(LinkNode {
                    instance,
                    type_name: String::new(),
                });
                self.index.insert(instance, child);
                self.graph.add_edge(at, child, kind);
            }
        }
    }

    fn add(&mut self, component: &dyn Component) -> NodeIndex {
        let idx = self.graph.add_node(LinkNode {
            instance: component.instance_id(),
            type_name: component.type_name().to_string(),
        });
        self.index.insert(component.instance_id(), idx);
        idx
    }
}
