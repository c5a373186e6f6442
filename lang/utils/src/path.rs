//! Hierarchical identifiers for declarations and synthesized temporaries.

use std::{fmt, rc::Rc};

/// A scoped name such as `main.$block0.x`; cheap to clone and to extend.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IdentifierPath(Rc<[String]>);

impl IdentifierPath {
    pub fn new(segment: impl Into<String>) -> Self {
        IdentifierPath(Rc::from(vec![segment.into()]))
    }
    pub fn root() -> Self {
        IdentifierPath(Rc::from(Vec::new()))
    }
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.to_vec();
        segments.push(segment.into());
        IdentifierPath(Rc::from(segments))
    }
    pub fn pop(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(IdentifierPath(Rc::from(init.to_vec())))
    }
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
    pub fn segments(&self) -> &[String] {
        &self.0
    }
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
    /// Whether `self` is `other` or nested somewhere inside it.
    pub fn starts_with(&self, other: &IdentifierPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for IdentifierPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl fmt::Debug for IdentifierPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self)
    }
}
