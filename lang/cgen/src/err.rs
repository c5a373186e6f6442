use helix_syntax::ExprId;
use helix_utils::prelude::Span;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error(
        "{span}: Lifetime Inference Failed: The lifetime of this new object allocation has failed \
         because it is dependent on a root that does not exist at this point in the program and \
         must be calculated at runtime. Please try moving the allocation closer to the site of \
         its use."
    )]
    LifetimeInferenceFailed { span: Span },
    #[error("internal error: no analysis results for expression {0:?}")]
    MissingBounds(ExprId),
    #[error("internal error: region {0} has no C name")]
    UnknownRegion(String),
    #[error("internal error: variable `{0}` is not in scope")]
    UnknownVariable(String),
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, CodegenError>;
