use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    #[error("duplicate struct `{0}`")]
    DuplicateStruct(String),
    #[error("duplicate function `{0}`")]
    DuplicateFunction(String),
    #[error("unknown struct `{0}`")]
    UnknownStruct(String),
}

pub type Result<T> = std::result::Result<T, LowerError>;
