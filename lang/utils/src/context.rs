//! Unordered, persistent sets.

/// CoContexts are unordered sets of elements with cheap clones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoContext<T: std::hash::Hash + Eq>(pub im::HashSet<T>);

impl<T> FromIterator<T> for CoContext<T>
where
    T: std::hash::Hash + Eq + Clone,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        CoContext(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for CoContext<T>
where
    T: std::hash::Hash + Eq + Clone,
{
    type Item = T;
    type IntoIter = im::hashset::ConsumingIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a CoContext<T>
where
    T: std::hash::Hash + Eq,
{
    type Item = &'a T;
    type IntoIter = im::hashset::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> CoContext<T>
where
    T: std::hash::Hash + Eq,
{
    pub fn iter(&self) -> <&Self as IntoIterator>::IntoIter {
        self.into_iter()
    }

    pub fn new() -> Self {
        CoContext(im::HashSet::new())
    }

    pub fn singleton(item: T) -> Self
    where
        T: Clone,
    {
        CoContext::from_iter([item])
    }

    pub fn contains(&self, item: &T) -> bool {
        self.0.contains(item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for CoContext<T>
where
    T: std::hash::Hash + Eq,
{
    fn default() -> Self {
        CoContext::new()
    }
}

impl<T> std::ops::Add for CoContext<T>
where
    T: std::hash::Hash + Eq + Clone,
{
    type Output = Self;
    fn add(self, other: Self) -> Self {
        let mut set = self.0;
        set.extend(other.0);
        CoContext(set)
    }
}

impl<T> std::ops::Add<T> for CoContext<T>
where
    T: std::hash::Hash + Eq + Clone,
{
    type Output = Self;
    fn add(self, item: T) -> Self {
        let mut set = self.0;
        set.insert(item);
        CoContext(set)
    }
}

impl<T> std::ops::AddAssign<T> for CoContext<T>
where
    T: std::hash::Hash + Eq + Clone,
{
    fn add_assign(&mut self, item: T) {
        self.0.insert(item);
    }
}

impl<T> std::ops::Sub<&T> for CoContext<T>
where
    T: std::hash::Hash + Eq + Clone,
{
    type Output = Self;
    fn sub(self, item: &T) -> Self {
        let mut set = self.0;
        set.remove(item);
        CoContext(set)
    }
}

impl<T> std::ops::Sub for CoContext<T>
where
    T: std::hash::Hash + Eq + Clone,
{
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        CoContext(self.0.relative_complement(other.0))
    }
}
