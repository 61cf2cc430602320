//! Effect propagation experiments
//!
//! Tests that applying an effect to a link graph:
//! 1. Terminates on cycles and reaches each object once
//! 2. Only enters objects whose capabilities match the effect
//! 3. Keeps walking past failures but reports them

mod common;

use common::{Amplified, Cell, Toxin};
use organelle_core::catalog::Catalog;
use organelle_core::error::PropagationError;
use organelle_core::types::OwnershipKind;
use organelle_runtime::component::{lock, SharedComponent};
use organelle_runtime::composite::Target;
use organelle_runtime::propagate::{apply_effect, revert_effect};
use organelle_runtime::topology::LinkGraph;
use std::sync::Arc;

#[test]
fn cyclic_graph_terminates_and_visits_each_node_once() {
    let catalog = Catalog::shared();
    let a = Cell::new(&catalog, "alpha", &["sensitive"]).into_shared();
    let b = Cell::new(&catalog, "beta", &["sensitive"]).into_shared();
    let a_dyn: SharedComponent = a.clone();
    let b_dyn: SharedComponent = b.clone();

    lock(&a)
        .composite
        .link(Target::weak(&b_dyn), OwnershipKind::Borrowed)
        .unwrap();
    lock(&b)
        .composite
        .link(Target::weak(&a_dyn), OwnershipKind::Borrowed)
        .unwrap();

    let toxin = Toxin::new(&["sensitive"]);
    {
        let mut root = lock(&a);
        assert_eq!(apply_effect(&mut *root, &toxin), Ok(()));
    }

    assert_eq!(lock(&a).applied, 1);
    assert_eq!(lock(&b).applied, 1);

    let graph = LinkGraph::from_root(&*lock(&a));
    assert!(graph.has_cycle());
    assert_eq!(graph.node_count(), 2);
}

#[test]
fn convergent_paths_reach_a_target_once() {
    let catalog = Catalog::shared();
    let shared_d = Cell::new(&catalog, "delta", &["sensitive"]).into_shared();
    let d_dyn: SharedComponent = shared_d.clone();

    let mut b = Cell::new(&catalog, "beta", &["sensitive"]);
    b.composite
        .link(Target::weak(&d_dyn), OwnershipKind::Borrowed)
        .unwrap();
    let mut c = Cell::new(&catalog, "gamma", &["sensitive"]);
    c.composite
        .link(Target::weak(&d_dyn), OwnershipKind::Borrowed)
        .unwrap();

    let mut a = Cell::new(&catalog, "alpha", &["sensitive"]);
    a.composite.link(Target::boxed(b), OwnershipKind::Owned).unwrap();
    a.composite.link(Target::boxed(c), OwnershipKind::Owned).unwrap();

    let toxin = Toxin::new(&["sensitive"]);
    assert!(apply_effect(&mut a, &toxin).is_ok());
    assert_eq!(a.applied, 1);
    assert_eq!(lock(&shared_d).applied, 1);

    let graph = LinkGraph::from_root(&a);
    assert!(!graph.has_cycle());
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.reachable_from_root(), 4);
}

#[test]
fn incompatible_targets_are_skipped() {
    let catalog = Catalog::shared();
    let spore = Cell::new(&catalog, "spore", &["dormant"]).into_shared();
    let leaf = Cell::new(&catalog, "leaf", &["sensitive", "photosynthetic"]).into_shared();
    let spore_dyn: SharedComponent = spore.clone();
    let leaf_dyn: SharedComponent = leaf.clone();

    let mut host = Cell::new(&catalog, "host", &["sensitive"]);
    host.composite
        .link(Target::weak(&spore_dyn), OwnershipKind::Borrowed)
        .unwrap();
    host.composite
        .link(Target::weak(&leaf_dyn), OwnershipKind::Borrowed)
        .unwrap();

    let toxin = Toxin::new(&["sensitive"]);
    assert!(apply_effect(&mut host, &toxin).is_ok());
    assert_eq!(host.applied, 1);
    assert_eq!(lock(&spore).applied, 0);
    assert_eq!(lock(&leaf).applied, 1);
}

#[test]
fn failures_do_not_stop_the_walk() {
    let catalog = Catalog::shared();
    let broken = Cell::new(&catalog, "broken", &["sensitive"])
        .failing()
        .into_shared();
    let healthy = Cell::new(&catalog, "healthy", &["sensitive"]).into_shared();
    let broken_dyn: SharedComponent = broken.clone();
    let healthy_dyn: SharedComponent = healthy.clone();

    let mut host = Cell::new(&catalog, "host", &["sensitive"]);
    host.composite
        .link(Target::weak(&broken_dyn), OwnershipKind::Borrowed)
        .unwrap();
    host.composite
        .link(Target::weak(&healthy_dyn), OwnershipKind::Borrowed)
        .unwrap();

    let toxin = Toxin::new(&["sensitive"]);
    assert_eq!(apply_effect(&mut host, &toxin), Err(PropagationError::Failed));
    assert_eq!(lock(&broken).applied, 1);
    assert_eq!(lock(&healthy).applied, 1);
}

#[test]
fn revert_runs_the_revert_hook() {
    let catalog = Catalog::shared();
    let mut host = Cell::new(&catalog, "host", &["sensitive"]);
    let child = Cell::new(&catalog, "child", &["sensitive"]).into_shared();
    let child_dyn: SharedComponent = child.clone();
    host.composite
        .link(Target::weak(&child_dyn), OwnershipKind::Borrowed)
        .unwrap();

    let toxin = Toxin::new(&["sensitive"]);
    assert!(revert_effect(&mut host, &toxin).is_ok());
    assert_eq!(host.reverted, 1);
    assert_eq!(host.applied, 0);
    assert_eq!(lock(&child).reverted, 1);
}

#[test]
fn poisoned_targets_still_receive_effects() {
    let catalog = Catalog::shared();
    let victim = Cell::new(&catalog, "victim", &["sensitive"]).into_shared();
    let victim_dyn: SharedComponent = victim.clone();

    let poisoner = Arc::clone(&victim);
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.lock().unwrap();
        panic!("poison the target");
    })
    .join();
    assert!(victim.is_poisoned());

    let mut host = Cell::new(&catalog, "host", &["sensitive"]);
    host.composite
        .link(Target::weak(&victim_dyn), OwnershipKind::Borrowed)
        .unwrap();

    let toxin = Toxin::new(&["sensitive"]);
    assert!(apply_effect(&mut host, &toxin).is_ok());
    assert_eq!(lock(&victim).applied, 1);
}

#[test]
fn links_back_to_the_effect_are_skipped() {
    let catalog = Catalog::shared();
    // The effect object is itself a linked component here.
    let plasmid = Cell::new(&catalog, "plasmid", &["sensitive"]).into_shared();
    let plasmid_dyn: SharedComponent = plasmid.clone();
    let plasmid_id = lock(&plasmid).id;

    let mut host = Cell::new(&catalog, "host", &["sensitive"]);
    host.composite
        .link(Target::weak(&plasmid_dyn), OwnershipKind::Borrowed)
        .unwrap();

    let mut toxin = Toxin::new(&["sensitive"]);
    toxin.id = plasmid_id;
    assert!(apply_effect(&mut host, &toxin).is_ok());
    assert_eq!(host.applied, 1);
    assert_eq!(lock(&plasmid).applied, 0);
}

#[test]
fn wrapped_effects_propagate_in_canonical_form() {
    let catalog = Catalog::shared();
    let mut host = Cell::new(&catalog, "host", &["sensitive"]);
    host.composite
        .link(
            Target::boxed(Cell::new(&catalog, "organelle", &["sensitive"])),
            OwnershipKind::Owned,
        )
        .unwrap();

    let toxin = Toxin::new(&["sensitive"]);
    // The wrapper declares no capabilities; only its base does.
    let wrapped = Amplified { inner: &toxin };
    assert!(apply_effect(&mut host, &wrapped).is_ok());
    assert_eq!(host.seen_effects, vec!["toxin".to_string()]);

    let slot = host.composite.find_slot_by_name("organelle").unwrap();
    let graph = LinkGraph::from_root(&host);
    assert_eq!(graph.node_count(), 2);
    assert!(host.composite.linked_object(slot).is_some());
}

#[test]
fn registry_associations_open_up_propagation() {
    let catalog = Catalog::shared();
    let mut host = Cell::new(&catalog, "host", &["sensitive"]);
    let inert = Cell::new(&catalog, "inert", &[]).into_shared();
    let inert_dyn: SharedComponent = inert.clone();
    host.composite
        .link(Target::weak(&inert_dyn), OwnershipKind::Borrowed)
        .unwrap();

    let toxin = Toxin::new(&["sensitive"]);
    apply_effect(&mut host, &toxin).unwrap();
    assert_eq!(lock(&inert).applied, 0);

    catalog.capabilities().associate_tags(catalog.type_id("inert"), &["sensitive"]);
    apply_effect(&mut host, &toxin).unwrap();
    assert_eq!(lock(&inert).applied, 1);
    assert_eq!(host.applied, 2);
}

#[test]
fn link_graph_exports_json() {
    let catalog = Catalog::shared();
    let mut host = Cell::new(&catalog, "host", &[]);
    host.composite
        .link(Target::boxed(Cell::new(&catalog, "nucleus", &[])), OwnershipKind::Owned)
        .unwrap();

    let graph = LinkGraph::from_root(&host);
    let json = graph.to_json();
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["edges"][0]["kind"], "Owned");
    assert_eq!(graph.edges()[0].from, host.id);
}
