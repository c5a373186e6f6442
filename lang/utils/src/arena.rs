use std::{
    collections::HashMap,
    hash::Hash,
    ops::{AddAssign, Index, IndexMut},
};

pub use crate::new_key_type;

/// Ids handed out by an arena; `Copy` handles into a side vector.
pub trait IndexLike: Clone + Copy + Eq + Hash {
    fn new(idx: usize) -> Self;
    fn index(&self) -> usize;
}

/* ---------------------------------- Dense --------------------------------- */

/// Append-only storage; ids are handed out in allocation order.
#[derive(Debug)]
pub struct ArenaDense<Id, T> {
    vec: Vec<T>,
    _marker: std::marker::PhantomData<Id>,
}

impl<Id, T> Default for ArenaDense<Id, T> {
    fn default() -> Self {
        ArenaDense { vec: Vec::new(), _marker: std::marker::PhantomData }
    }
}

impl<Id: IndexLike, T> ArenaDense<Id, T> {
    pub fn alloc(&mut self, val: T) -> Id {
        self.vec.push(val);
        Id::new(self.vec.len() - 1)
    }
    pub fn get(&self, id: &Id) -> Option<&T> {
        self.vec.get(id.index())
    }
    pub fn get_mut(&mut self, id: &Id) -> Option<&mut T> {
        self.vec.get_mut(id.index())
    }
    pub fn len(&self) -> usize {
        self.vec.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.vec.iter().enumerate().map(|(idx, val)| (Id::new(idx), val))
    }
}

impl<Id: IndexLike, T> Index<&Id> for ArenaDense<Id, T> {
    type Output = T;
    fn index(&self, id: &Id) -> &T {
        &self.vec[id.index()]
    }
}

impl<Id: IndexLike, T> IndexMut<&Id> for ArenaDense<Id, T> {
    fn index_mut(&mut self, id: &Id) -> &mut T {
        &mut self.vec[id.index()]
    }
}

/* ---------------------------------- Assoc --------------------------------- */

/// Side table keyed by ids allocated elsewhere.
#[derive(Debug, Clone)]
pub struct ArenaAssoc<Id, T> {
    map: HashMap<Id, T>,
}

impl<Id, T> ArenaAssoc<Id, T> {
    pub fn new() -> Self {
        ArenaAssoc { map: HashMap::new() }
    }
}

impl<Id, T> Default for ArenaAssoc<Id, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Eq + Hash, T> ArenaAssoc<Id, T> {
    pub fn insert(&mut self, id: Id, val: T) {
        self.map.insert(id, val);
    }
    pub fn get(&self, id: &Id) -> Option<&T> {
        self.map.get(id)
    }
    pub fn get_mut(&mut self, id: &Id) -> Option<&mut T> {
        self.map.get_mut(id)
    }
    pub fn contains_key(&self, id: &Id) -> bool {
        self.map.contains_key(id)
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, Id, T> {
        self.map.iter()
    }
}

impl<Id: Eq + Hash, T> Index<&Id> for ArenaAssoc<Id, T> {
    type Output = T;
    fn index(&self, id: &Id) -> &T {
        &self.map[id]
    }
}

impl<Id, T> IntoIterator for ArenaAssoc<Id, T> {
    type Item = (Id, T);
    type IntoIter = std::collections::hash_map::IntoIter<Id, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl<'a, Id, T> IntoIterator for &'a ArenaAssoc<Id, T> {
    type Item = (&'a Id, &'a T);
    type IntoIter = std::collections::hash_map::Iter<'a, Id, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl<Id: Eq + Hash, T> Extend<(Id, T)> for ArenaAssoc<Id, T> {
    fn extend<I: IntoIterator<Item = (Id, T)>>(&mut self, iter: I) {
        for (id, val) in iter {
            self.insert(id, val);
        }
    }
}

impl<Id: Eq + Hash, T> AddAssign for ArenaAssoc<Id, T> {
    fn add_assign(&mut self, rhs: ArenaAssoc<Id, T>) {
        self.extend(rhs);
    }
}

#[macro_export]
macro_rules! new_key_type {
    ( $(#[$outer:meta])* $vis:vis struct $name:ident ; $($rest:tt)* ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
        $vis struct $name(usize);

        impl $crate::arena::IndexLike for $name {
            fn new(idx: usize) -> Self {
                Self(idx)
            }
            fn index(&self) -> usize {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        $crate::new_key_type!($($rest)*);
    };
    () => {}
}
