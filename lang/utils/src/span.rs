use serde::{Deserialize, Serialize};
use std::{
    fmt::{Debug, Display},
    path::PathBuf,
    sync::Arc,
};

/// Source range reported by the upstream front end as line/column pairs.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Cursor2,
    pub end: Cursor2,
    #[serde(skip)]
    path: Option<Arc<PathBuf>>,
}

impl Span {
    pub fn new(start: Cursor2, end: Cursor2) -> Span {
        Span { start, end, path: None }
    }
    pub fn dummy() -> Span {
        Span::default()
    }
    pub fn is_dummy(&self) -> bool {
        self.start == Cursor2::default() && self.end == Cursor2::default() && self.path.is_none()
    }
    pub fn line(line: usize) -> Span {
        Span::new(Cursor2 { line, column: 0 }, Cursor2 { line, column: 0 })
    }
    pub fn with_path(mut self, path: Arc<PathBuf>) -> Self {
        self.path = Some(path);
        self
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Span { start, end, path } = self;
        if let Some(path) = path {
            write!(f, "{}:", path.display())?;
        }
        write!(f, "{start} - {end}")
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor2 {
    pub line: usize,
    pub column: usize,
}
impl Display for Cursor2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Cursor2 { line, column } = self;
        write!(f, "{line}:{column}",)
    }
}

