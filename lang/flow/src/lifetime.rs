use helix_utils::prelude::*;
use std::{collections::HashMap, fmt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifetimeRole {
    /// A region not derived from any other lifetime in the analysis.
    Root,
    Alias,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifetimeOrigin {
    LocalValue,
    LocalLocation,
    TempValue,
    Other,
}

/// Compile-time identity of the storage a value may live in.
///
/// Two lifetimes with the same path, role, origin and version are the
/// same node; [`LifetimeArena::intern`] hands out one [`LifetimeId`] per
/// distinct value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Lifetime {
    pub path: IdentifierPath,
    pub role: LifetimeRole,
    pub origin: LifetimeOrigin,
    pub version: usize,
}

impl Lifetime {
    pub fn new(path: IdentifierPath, role: LifetimeRole, origin: LifetimeOrigin) -> Self {
        Lifetime { path, role, origin, version: 0 }
    }
    pub fn root(path: IdentifierPath, origin: LifetimeOrigin) -> Self {
        Lifetime::new(path, LifetimeRole::Root, origin)
    }
    pub fn alias(path: IdentifierPath, origin: LifetimeOrigin) -> Self {
        Lifetime::new(path, LifetimeRole::Alias, origin)
    }
    pub fn is_root(&self) -> bool {
        self.role == LifetimeRole::Root
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self.role {
            | LifetimeRole::Root => "root",
            | LifetimeRole::Alias => "alias",
        };
        write!(f, "{}@{}[{}]", self.path, self.version, role)
    }
}

impl fmt::Debug for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self, self.origin)
    }
}

new_key_type! {
    pub struct LifetimeId;
}

impl LifetimeId {
    /// The outermost region, alive for the whole program.
    pub const HEAP: LifetimeId = LifetimeId(0);
    /// Owned by value types; absorbing, never part of the graph.
    pub const NONE: LifetimeId = LifetimeId(1);

    pub fn is_none(&self) -> bool {
        *self == LifetimeId::NONE
    }
}

/// Interning arena for lifetimes. The two sentinels occupy the first two
/// slots so that every pass refers to the same `Heap` and `None`.
#[derive(Debug)]
pub struct LifetimeArena {
    lifetimes: ArenaDense<LifetimeId, Lifetime>,
    interned: HashMap<Lifetime, LifetimeId>,
    /// highest version handed out per (path, role, origin)
    versions: HashMap<(IdentifierPath, LifetimeRole, LifetimeOrigin), usize>,
}

impl Default for LifetimeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl LifetimeArena {
    pub fn new() -> Self {
        let mut arena = LifetimeArena {
            lifetimes: ArenaDense::default(),
            interned: HashMap::new(),
            versions: HashMap::new(),
        };
        let heap =
            arena.intern(Lifetime::root(IdentifierPath::new("$heap"), LifetimeOrigin::Other));
        let none =
            arena.intern(Lifetime::alias(IdentifierPath::new("$none"), LifetimeOrigin::Other));
        debug_assert_eq!(heap, LifetimeId::HEAP);
        debug_assert_eq!(none, LifetimeId::NONE);
        arena
    }

    pub fn intern(&mut self, lifetime: Lifetime) -> LifetimeId {
        if let Some(id) = self.interned.get(&lifetime) {
            return *id;
        }
        let key = (lifetime.path.clone(), lifetime.role, lifetime.origin);
        let top = self.versions.entry(key).or_insert(lifetime.version);
        *top = (*top).max(lifetime.version);
        let id = self.lifetimes.alloc(lifetime.clone());
        self.interned.insert(lifetime, id);
        id
    }

    /// A fresh lifetime for the same storage after a strong update.
    ///
    /// The version is one past the highest version ever issued for this
    /// path, so sibling updates of the same variable never collide.
    pub fn increment_version(&mut self, id: LifetimeId) -> LifetimeId {
        if id.is_none() {
            return id;
        }
        let lifetime = self.lifetimes[&id].clone();
        let key = (lifetime.path.clone(), lifetime.role, lifetime.origin);
        let version = self.versions.get(&key).copied().unwrap_or(lifetime.version) + 1;
        self.intern(Lifetime { version, ..lifetime })
    }

    pub fn len(&self) -> usize {
        self.lifetimes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lifetimes.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (LifetimeId, &Lifetime)> {
        self.lifetimes.iter()
    }
}

impl std::ops::Index<&LifetimeId> for LifetimeArena {
    type Output = Lifetime;
    fn index(&self, id: &LifetimeId) -> &Lifetime {
        &self.lifetimes[id]
    }
}

/// Lifetimes attached to a checked expression: the produced value and,
/// for assignable places, the storage location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LifetimeBounds {
    pub rvalue: LifetimeId,
    pub lvalue: LifetimeId,
}

impl LifetimeBounds {
    pub fn new(rvalue: LifetimeId, lvalue: LifetimeId) -> Self {
        LifetimeBounds { rvalue, lvalue }
    }
    pub fn none() -> Self {
        LifetimeBounds::new(LifetimeId::NONE, LifetimeId::NONE)
    }
    pub fn value(rvalue: LifetimeId) -> Self {
        LifetimeBounds::new(rvalue, LifetimeId::NONE)
    }
}

impl Default for LifetimeBounds {
    fn default() -> Self {
        LifetimeBounds::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sentinels_are_reserved() {
        let mut arena = LifetimeArena::new();
        let heap = Lifetime::root(IdentifierPath::new("$heap"), LifetimeOrigin::Other);
        assert_eq!(arena.intern(heap), LifetimeId::HEAP);
        assert!(arena[&LifetimeId::HEAP].is_root());
        assert!(!arena[&LifetimeId::NONE].is_root());
        assert_eq!(arena.increment_version(LifetimeId::NONE), LifetimeId::NONE);
    }

    #[test]
    fn equality_is_structural() {
        let mut arena = LifetimeArena::new();
        let x = IdentifierPath::new("main").append("x");
        let a = arena.intern(Lifetime::alias(x.clone(), LifetimeOrigin::LocalValue));
        let b = arena.intern(Lifetime::alias(x.clone(), LifetimeOrigin::LocalValue));
        let c = arena.intern(Lifetime::alias(x, LifetimeOrigin::LocalLocation));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn increments_never_collide() {
        let mut arena = LifetimeArena::new();
        let x = arena.intern(Lifetime::alias(IdentifierPath::new("x"), LifetimeOrigin::LocalValue));
        let left = arena.increment_version(x);
        let right = arena.increment_version(x);
        assert_ne!(left, x);
        assert_ne!(left, right);
        assert_eq!(arena[&left].version, 1);
        assert_eq!(arena[&right].version, 2);
        assert_eq!(arena[&right].path, arena[&x].path);
    }
}
