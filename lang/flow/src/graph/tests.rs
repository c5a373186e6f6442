use super::*;
use helix_utils::prelude::*;
use pretty_assertions::assert_eq;

fn alias(g: &mut DataFlowGraph, name: &str) -> LifetimeId {
    g.intern(Lifetime::alias(IdentifierPath::new(name), LifetimeOrigin::LocalValue))
}
fn root(g: &mut DataFlowGraph, name: &str) -> LifetimeId {
    g.intern(Lifetime::root(IdentifierPath::new(name), LifetimeOrigin::Other))
}

#[test]
fn nothing_outlives_itself_without_a_cycle() {
    let mut g = DataFlowGraph::new();
    let a = alias(&mut g, "a");
    let b = alias(&mut g, "b");
    g.add_stored(a, b);
    assert!(!g.does_outlive(a, a));
    assert!(!g.does_outlive(b, b));
    g.add_assignment(a, b);
    assert!(g.does_outlive(a, a));
    assert!(g.does_outlive(b, b));
}

#[test]
fn absorbing_and_reflexive_edges_are_dropped() {
    let mut g = DataFlowGraph::new();
    let a = alias(&mut g, "a");
    g.add_assignment(a, LifetimeId::NONE);
    g.add_stored(LifetimeId::NONE, a);
    g.add_member(a, LifetimeId::NONE);
    g.add_stored(a, a);
    g.add_assignment(a, a);
    assert_eq!(g.edges().count(), 0);
    assert!(g.get_outlived_lifetimes(LifetimeId::NONE).is_empty());
    assert!(!g.does_outlive(a, a));
}

#[test]
fn assignment_is_symmetric() {
    let mut g = DataFlowGraph::new();
    let a = alias(&mut g, "a");
    let b = alias(&mut g, "b");
    g.add_assignment(a, b);
    assert!(g.does_outlive(a, b));
    assert!(g.does_outlive(b, a));
    assert!(g.get_equivalent_lifetimes(b).contains(&a));
    assert!(g.get_equivalent_lifetimes(a).contains(&b));
}

#[test]
fn stored_is_directional() {
    let mut g = DataFlowGraph::new();
    let value = alias(&mut g, "value");
    let container = alias(&mut g, "container");
    g.add_stored(value, container);
    assert!(g.get_outlived_lifetimes(value).contains(&container));
    assert!(!g.get_outlived_lifetimes(container).contains(&value));
    assert!(!g.get_equivalent_lifetimes(value).contains(&container));
}

#[test]
fn reachability_is_transitive_and_inverse() {
    let mut g = DataFlowGraph::new();
    let ids: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| alias(&mut g, n)).collect();
    g.add_stored(ids[0], ids[1]);
    g.add_assignment(ids[1], ids[2]);
    g.add_stored(ids[3], ids[2]);
    assert!(g.does_outlive(ids[0], ids[2]));
    assert!(!g.does_outlive(ids[2], ids[3]));
    for a in ids.iter() {
        for b in ids.iter() {
            assert_eq!(
                g.get_outlived_lifetimes(*a).contains(b),
                g.get_precursor_lifetimes(*b).contains(a),
                "{:?} -> {:?}",
                a,
                b
            );
        }
    }
}

#[test]
fn members_are_found_through_equivalents() {
    let mut g = DataFlowGraph::new();
    let s = alias(&mut g, "s");
    let t = alias(&mut g, "t");
    let next = g.intern(Lifetime::alias(
        IdentifierPath::new("s").append("next"),
        LifetimeOrigin::LocalValue,
    ));
    g.add_member(s, next);
    g.add_assignment(s, t);
    assert_eq!(g.get_member_lifetimes(t, "next"), vec![next]);
    assert!(g.get_member_lifetimes(t, "prev").is_empty());
    // member edges carry no outliving
    assert!(!g.does_outlive(s, next));
}

#[test]
fn maximum_roots_keep_the_longest_lived() {
    let mut g = DataFlowGraph::new();
    let outer = root(&mut g, "outer");
    let inner = root(&mut g, "inner");
    let x = alias(&mut g, "x");
    // the outer region outlives the inner one
    g.add_stored(LifetimeId::HEAP, outer);
    g.add_stored(outer, inner);
    g.add_stored(x, inner);
    g.add_stored(x, outer);
    let roots = g.get_maximum_roots(x);
    assert_eq!(roots, vec![outer]);
    for r in roots.iter() {
        for r2 in roots.iter() {
            assert!(r == r2 || !(g.does_outlive(*r2, *r) && !g.does_outlive(*r, *r2)));
        }
    }
}

#[test]
fn unrelated_roots_both_survive() {
    let mut g = DataFlowGraph::new();
    let left = root(&mut g, "left");
    let right = root(&mut g, "right");
    let x = alias(&mut g, "x");
    g.add_stored(x, left);
    g.add_stored(x, right);
    assert_eq!(g.get_maximum_roots(x), vec![left, right]);
}

#[test]
fn dominant_roots_count_the_root_itself() {
    let mut g = DataFlowGraph::new();
    let r = root(&mut g, "r");
    g.add_stored(LifetimeId::HEAP, r);
    assert!(g.get_maximum_roots(r).is_empty());
    assert_eq!(g.get_dominant_roots(r), vec![r]);
    assert_eq!(g.get_dominant_roots(LifetimeId::HEAP), vec![LifetimeId::HEAP]);
}
