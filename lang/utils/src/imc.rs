//! Persistent maps for scoped bindings.

use std::{borrow::Borrow, hash::Hash, ops::AddAssign};

/// Persistent map; a clone shares structure with its origin and the two
/// diverge independently afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImMap<K: Hash + Eq + Clone, V: Clone>(im::HashMap<K, V>);

impl<K: Hash + Eq + Clone, V: Clone> Default for ImMap<K, V> {
    fn default() -> Self {
        ImMap(im::HashMap::new())
    }
}

impl<K: Hash + Eq + Clone, V: Clone> ImMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn singleton(k: K, v: V) -> Self {
        ImMap(im::HashMap::unit(k, v))
    }
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.0.get(k)
    }
    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        Q: Hash + Eq + ?Sized,
        K: Borrow<Q>,
    {
        self.0.contains_key(k)
    }
    pub fn iter(&self) -> im::hashmap::Iter<'_, K, V> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Bind (or shadow) one entry in place.
impl<K: Hash + Eq + Clone, V: Clone> AddAssign<(K, V)> for ImMap<K, V> {
    fn add_assign(&mut self, (k, v): (K, V)) {
        self.0.insert(k, v);
    }
}

impl<K: Hash + Eq + Clone, V: Clone> FromIterator<(K, V)> for ImMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ImMap(iter.into_iter().collect())
    }
}
