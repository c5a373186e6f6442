use helix_cgen::CodegenError;
use helix_flow::FlowError;
use helix_syntax::LowerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed module: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Lowering error:\n\t{0}")]
    LowerError(#[from] LowerError),
    #[error("{0}")]
    FlowError(#[from] FlowError),
    #[error("{0}")]
    CodegenError(#[from] CodegenError),
}

pub type Result<T> = std::result::Result<T, BuildError>;
