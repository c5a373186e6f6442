//! Per-scope analysis state.

use crate::{graph::DataFlowGraph, lifetime::*};
use helix_utils::prelude::*;

/// Bindings and roots visible in one lexical scope.
///
/// The maps are persistent, so [`FlowFrame::child`] is a structural share
/// rather than a copy. The graph is borrowed, never cloned: a child
/// reborrows it from its parent, which is what keeps sibling branches
/// sequential and lets only the parent merge what they learned.
pub struct FlowFrame<'g> {
    pub graph: &'g mut DataFlowGraph,
    /// source name to declaration path
    pub names: ImMap<String, IdentifierPath>,
    pub locals: ImMap<IdentifierPath, LifetimeBounds>,
    /// region names usable by `from`
    pub regions: ImMap<String, LifetimeId>,
    /// roots that exist at this point of the program
    pub roots: CoContext<LifetimeId>,
    pub scope: IdentifierPath,
    /// region that owns locations declared in this scope
    pub scope_root: LifetimeId,
    /// nearest region that outlives the enclosing function activation
    pub heap_root: LifetimeId,
    /// region named by the innermost `from`
    pub pinned: Option<LifetimeId>,
}

impl<'g> FlowFrame<'g> {
    /// The frame of a function body, rooted at the heap.
    pub fn new(graph: &'g mut DataFlowGraph, scope: IdentifierPath) -> Self {
        FlowFrame {
            graph,
            names: ImMap::new(),
            locals: ImMap::new(),
            regions: ImMap::new(),
            roots: CoContext::singleton(LifetimeId::HEAP),
            scope,
            scope_root: LifetimeId::HEAP,
            heap_root: LifetimeId::HEAP,
            pinned: None,
        }
    }

    /// A nested scope sharing this frame's bindings.
    pub fn child(&mut self, segment: impl Into<String>) -> FlowFrame<'_> {
        FlowFrame {
            graph: &mut *self.graph,
            names: self.names.clone(),
            locals: self.locals.clone(),
            regions: self.regions.clone(),
            roots: self.roots.clone(),
            scope: self.scope.append(segment),
            scope_root: self.scope_root,
            heap_root: self.heap_root,
            pinned: self.pinned,
        }
    }

    pub fn path_of(&self, name: &str) -> IdentifierPath {
        self.scope.append(name)
    }

    pub fn declare(&mut self, name: &str, bounds: LifetimeBounds) -> IdentifierPath {
        let path = self.path_of(name);
        self.names += (name.to_string(), path.clone());
        self.locals += (path.clone(), bounds);
        path
    }

    pub fn lookup(&self, name: &str) -> Option<(IdentifierPath, LifetimeBounds)> {
        let path = self.names.get(name)?;
        let bounds = self.locals.get(path)?;
        Some((path.clone(), *bounds))
    }

    pub fn rebind(&mut self, path: IdentifierPath, bounds: LifetimeBounds) {
        self.locals += (path, bounds);
    }

    /// Make `root` a region this scope may allocate into.
    pub fn add_root(&mut self, root: LifetimeId) {
        self.roots += root;
    }

    pub fn get_maximum_roots(&self, l: LifetimeId) -> Vec<LifetimeId> {
        self.graph.get_maximum_roots(l)
    }

    /// Locals of this frame whose bounds differ from `before`, in a stable
    /// order.
    pub fn changed_since(
        &self, before: &ImMap<IdentifierPath, LifetimeBounds>,
    ) -> Vec<(IdentifierPath, LifetimeBounds)> {
        let mut changed: Vec<_> = (self.locals.iter())
            .filter(|(path, bounds)| {
                before.get(*path).is_some_and(|old| old != *bounds)
            })
            .map(|(path, bounds)| (path.clone(), *bounds))
            .collect();
        changed.sort_by(|(a, _), (b, _)| a.cmp(b));
        changed
    }
}
