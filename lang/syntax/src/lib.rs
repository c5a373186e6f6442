//! The type-checked tree handed over by the front end.
//!
//! Upstream passes deliver a nested [`tree::Module`] (usually as JSON);
//! [`lower::Lowerer`] flattens it into an arena-backed [`arena::Program`]
//! that the flow checker and the C emitter walk by [`ExprId`].

pub mod ty;
pub use ty::*;

pub mod tree;

pub mod arena;
pub use arena::*;

pub mod lower;
pub use lower::Lowerer;

pub mod err;
pub use err::*;

pub mod fmt;
pub use fmt::*;
