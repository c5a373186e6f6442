use helix_utils::span::Span;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error(
        "Unsafe Memory Store: the stored value belongs to a region that may be freed before the \
         place it is written into ({span})"
    )]
    UnsafeMemoryStore { span: Span },
    #[error("Unbound variable `{name}` ({span})")]
    UnboundVariable { name: String, span: Span },
    #[error("Unbound region `{name}` ({span})")]
    UnboundRegion { name: String, span: Span },
    #[error("Expression is not an assignable place ({span})")]
    NotAPlace { span: Span },
    #[error("`break` outside of a loop ({span})")]
    BreakOutsideLoop { span: Span },
    #[error("Function `{function}` does not return a value on every path")]
    MissingReturn { function: String },
}

pub type Result<T> = std::result::Result<T, FlowError>;
