//! Static region inference.
//!
//! The [`check::FlowChecker`] walks a lowered program once. At every node
//! it extends the shared [`graph::DataFlowGraph`] through the current
//! [`frame::FlowFrame`] and records the node's [`lifetime::LifetimeBounds`];
//! the C generator later asks the finished graph which region each
//! allocation belongs to.

pub mod lifetime;
pub use lifetime::*;

pub mod graph;
pub use graph::{DataFlowGraph, EdgeKind};

pub mod frame;
pub use frame::FlowFrame;

pub mod predicate;
pub use predicate::Predicate;

pub mod cfg;
pub use cfg::{CfgNode, ControlFlowGraph};

pub mod check;
pub use check::*;

pub mod err;
pub use err::*;

#[cfg(test)]
mod tests;
