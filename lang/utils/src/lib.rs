#![allow(clippy::style)]
#![allow(clippy::useless_format)]

pub mod arena;
pub mod context;
pub mod imc;
pub mod pass;
pub mod path;
pub mod span;

pub mod prelude {
    /// Source code location.
    pub use crate::span::{Cursor2, Span};
    /// Data structures.
    pub use crate::{
        arena::*,
        context::CoContext,
        imc::ImMap,
        pass::CompilerPass,
        path::IdentifierPath,
    };
}
