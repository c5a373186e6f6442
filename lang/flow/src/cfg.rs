//! Per-function control-flow graph.

use crate::predicate::Predicate;
use helix_utils::prelude::*;
use indexmap::{IndexMap, IndexSet};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CfgNode {
    Start,
    End,
    Scope(IdentifierPath),
}

impl fmt::Debug for CfgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | CfgNode::Start => write!(f, "<start>"),
            | CfgNode::End => write!(f, "<end>"),
            | CfgNode::Scope(path) => write!(f, "{}", path),
        }
    }
}

/// Program points of one function and the conditions guarding the edges
/// between them.
#[derive(Clone, Debug, Default)]
pub struct ControlFlowGraph {
    edges: IndexMap<CfgNode, IndexMap<CfgNode, Predicate>>,
    /// where control resumes when a scope is left early, e.g. by `break`
    continuations: IndexMap<CfgNode, CfgNode>,
}

impl ControlFlowGraph {
    pub fn new() -> Self {
        let mut cfg = Self::default();
        cfg.edges.insert(CfgNode::Start, IndexMap::new());
        cfg.edges.insert(CfgNode::End, IndexMap::new());
        cfg
    }

    pub fn add_node(&mut self, node: CfgNode) {
        self.edges.entry(node).or_default();
    }

    /// Parallel edges between the same nodes join their predicates.
    pub fn add_edge(&mut self, from: CfgNode, to: CfgNode, predicate: Predicate) {
        log::trace!("cfg edge {:?} -> {:?} when {}", from, to, predicate);
        self.add_node(to.clone());
        let out = self.edges.entry(from).or_default();
        let joined = match out.get(&to) {
            | Some(old) => old.or(&predicate),
            | None => predicate,
        };
        out.insert(to, joined);
    }

    pub fn add_continuation(&mut self, scope: CfgNode, next: CfgNode) {
        self.add_node(next.clone());
        self.continuations.insert(scope, next);
    }

    pub fn get_continuation(&self, scope: &CfgNode) -> Option<&CfgNode> {
        self.continuations.get(scope)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CfgNode> {
        self.edges.keys()
    }

    pub fn successors(&self, node: &CfgNode) -> impl Iterator<Item = (&CfgNode, &Predicate)> {
        (self.edges.get(node).into_iter().flatten()).filter(|(_, p)| !p.is_false())
    }

    pub fn has_predecessors(&self, node: &CfgNode) -> bool {
        self.edges.values().any(|out| out.get(node).is_some_and(|p| !p.is_false()))
    }

    /// Whether every path leaving `scope` eventually reaches [`CfgNode::End`].
    ///
    /// Computed as a greatest fixed point: a node fails once it has no live
    /// successor or one of its successors fails, so a cycle that never
    /// leaves counts as returning.
    pub fn always_returns(&self, scope: &CfgNode) -> bool {
        let mut returns: IndexSet<&CfgNode> = self.nodes().collect();
        loop {
            let failing: Vec<_> = (returns.iter())
                .filter(|node| ***node != CfgNode::End)
                .filter(|node| {
                    let mut succ = self.successors(node).peekable();
                    succ.peek().is_none() || succ.any(|(next, _)| !returns.contains(next))
                })
                .copied()
                .collect();
            if failing.is_empty() {
                break;
            }
            for node in failing {
                returns.shift_remove(node);
            }
        }
        returns.contains(scope)
    }

    /// The condition under which control flows from `a` to `b`.
    ///
    /// A worklist fixed point over the predicate lattice: the condition of
    /// reaching a node is the disjunction, over its incoming edges, of the
    /// source's condition and the edge predicate.
    pub fn get_predicates(&self, a: &CfgNode, b: &CfgNode) -> Predicate {
        let mut reach: IndexMap<&CfgNode, Predicate> = IndexMap::new();
        let Some((start, _)) = self.edges.get_key_value(a) else { return Predicate::ff() };
        reach.insert(start, Predicate::tt());
        let mut worklist = vec![start];
        while let Some(node) = worklist.pop() {
            let here = reach[node].clone();
            for (next, predicate) in self.successors(node) {
                let incoming = here.and(predicate);
                let updated = match reach.get(next) {
                    | Some(old) => old.or(&incoming),
                    | None => incoming,
                };
                if reach.get(next) != Some(&updated) {
                    reach.insert(next, updated);
                    worklist.push(next);
                }
            }
        }
        reach.get(b).cloned().unwrap_or_else(Predicate::ff)
    }
}
