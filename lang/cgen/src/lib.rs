//! The C backend.
//!
//! Every function takes the region it may allocate its result in as a
//! leading `void* env`. Allocations go to the region the flow analysis
//! selected for them, `region { .. }` blocks open and close their own
//! region around a `setjmp` guard, and `async` bodies are lifted into
//! static lambdas handed to `region_async`.

pub mod syntax;
pub mod runtime;
pub mod emit;
pub mod err;

pub use emit::{EmitOptions, Emitter};
pub use err::*;
