//! The append-only graph of lifetime facts shared by a whole analysis.

use crate::lifetime::*;
use indexmap::{IndexMap, IndexSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    /// both sides denote the same region; always inserted in pairs
    Equality,
    /// the source must stay valid at least as long as the target
    Dependence,
    /// structural containment; the target is a field of the source
    Member,
}

impl EdgeKind {
    fn is_flow(&self) -> bool {
        matches!(self, EdgeKind::Equality | EdgeKind::Dependence)
    }
}

type Adjacency = IndexMap<LifetimeId, IndexSet<(LifetimeId, EdgeKind)>>;

/// Lifetimes plus the edges between them.
///
/// Edges are only ever added. Queries see exactly the edges inserted so
/// far, so every fact about a lifetime has to be recorded before anything
/// asks about it.
#[derive(Debug, Default)]
pub struct DataFlowGraph {
    pub lifetimes: LifetimeArena,
    forward: Adjacency,
    backward: Adjacency,
}

impl DataFlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, lifetime: Lifetime) -> LifetimeId {
        self.lifetimes.intern(lifetime)
    }
    pub fn increment_version(&mut self, id: LifetimeId) -> LifetimeId {
        self.lifetimes.increment_version(id)
    }
    pub fn is_root(&self, id: &LifetimeId) -> bool {
        !id.is_none() && self.lifetimes[id].is_root()
    }

    fn insert(&mut self, from: LifetimeId, to: LifetimeId, kind: EdgeKind) -> bool {
        if from.is_none() || to.is_none() || from == to {
            return false;
        }
        let fresh = self.forward.entry(from).or_default().insert((to, kind));
        self.backward.entry(to).or_default().insert((from, kind));
        if fresh {
            log::trace!(
                "edge {:?}: {} -> {}",
                kind,
                self.lifetimes[&from],
                self.lifetimes[&to]
            );
        }
        fresh
    }

    /// `a` and `b` denote the same region.
    pub fn add_assignment(&mut self, a: LifetimeId, b: LifetimeId) {
        self.insert(a, b, EdgeKind::Equality);
        self.insert(b, a, EdgeKind::Equality);
    }

    /// `value` has been written into storage governed by `container`, so it
    /// must remain valid at least as long as `container` does.
    pub fn add_stored(&mut self, value: LifetimeId, container: LifetimeId) {
        self.insert(value, container, EdgeKind::Dependence);
    }

    /// `member` is the lifetime of a field of `parent`.
    pub fn add_member(&mut self, parent: LifetimeId, member: LifetimeId) {
        self.insert(parent, member, EdgeKind::Member);
    }

    fn reach(
        &self, start: LifetimeId, adjacency: &Adjacency, follow: impl Fn(&EdgeKind) -> bool,
    ) -> IndexSet<LifetimeId> {
        let mut visited = IndexSet::new();
        if start.is_none() {
            return visited;
        }
        let step = |id: &LifetimeId| {
            (adjacency.get(id).into_iter().flatten())
                .filter(|(_, kind)| follow(kind))
                .map(|(next, _)| *next)
                .filter(|next| !next.is_none())
                .collect::<Vec<_>>()
        };
        // the start is only reported when some path leads back to it
        let mut stack = step(&start);
        stack.reverse();
        while let Some(id) = stack.pop() {
            if visited.insert(id) {
                let mut next = step(&id);
                next.reverse();
                stack.extend(next);
            }
        }
        visited
    }

    /// Every lifetime that `l` must outlive.
    pub fn get_outlived_lifetimes(&self, l: LifetimeId) -> IndexSet<LifetimeId> {
        self.reach(l, &self.forward, EdgeKind::is_flow)
    }

    /// Every lifetime that must outlive `l`.
    pub fn get_precursor_lifetimes(&self, l: LifetimeId) -> IndexSet<LifetimeId> {
        self.reach(l, &self.backward, EdgeKind::is_flow)
    }

    pub fn get_equivalent_lifetimes(&self, l: LifetimeId) -> IndexSet<LifetimeId> {
        self.reach(l, &self.forward, |kind| *kind == EdgeKind::Equality)
    }

    pub fn does_outlive(&self, a: LifetimeId, b: LifetimeId) -> bool {
        self.get_outlived_lifetimes(a).contains(&b)
    }

    fn strictly_outlives(&self, a: LifetimeId, b: LifetimeId) -> bool {
        self.does_outlive(a, b) && !self.does_outlive(b, a)
    }

    /// Member lifetimes named `name` reachable from `parent`'s equivalence
    /// class.
    pub fn get_member_lifetimes(&self, parent: LifetimeId, name: &str) -> Vec<LifetimeId> {
        if parent.is_none() {
            return Vec::new();
        }
        let class = std::iter::once(parent).chain(self.get_equivalent_lifetimes(parent));
        let mut members = IndexSet::new();
        for id in class {
            for (next, kind) in self.forward.get(&id).into_iter().flatten() {
                if *kind == EdgeKind::Member && self.lifetimes[next].path.last() == Some(name) {
                    members.insert(*next);
                }
            }
        }
        members.into_iter().collect()
    }

    /// Drop every candidate that some other candidate strictly outlives.
    pub fn maximize(&self, candidates: impl IntoIterator<Item = LifetimeId>) -> Vec<LifetimeId> {
        let candidates: IndexSet<_> = candidates.into_iter().filter(|id| !id.is_none()).collect();
        (candidates.iter())
            .filter(|r| !candidates.iter().any(|r2| r2 != *r && self.strictly_outlives(*r2, **r)))
            .copied()
            .collect()
    }

    /// The non-redundant roots that `l` depends on, `l` itself excluded.
    pub fn get_maximum_roots(&self, l: LifetimeId) -> Vec<LifetimeId> {
        let candidates = (self.get_outlived_lifetimes(l).into_iter())
            .filter(|r| *r != l && self.is_root(r));
        let roots = self.maximize(candidates);
        log::trace!("maximum roots of {}: {:?}", self.lifetimes[&l], roots);
        roots
    }

    /// Like [`Self::get_maximum_roots`] but counting `l` when it is a root.
    pub fn get_dominant_roots(&self, l: LifetimeId) -> Vec<LifetimeId> {
        let own = self.is_root(&l).then_some(l);
        let candidates = (self.get_outlived_lifetimes(l).into_iter())
            .filter(|r| self.is_root(r))
            .chain(own);
        self.maximize(candidates)
    }

    pub fn edges(&self) -> impl Iterator<Item = (LifetimeId, LifetimeId, EdgeKind)> + '_ {
        (self.forward.iter())
            .flat_map(|(from, tos)| tos.iter().map(move |(to, kind)| (*from, *to, *kind)))
    }
}

#[cfg(test)]
mod tests;
