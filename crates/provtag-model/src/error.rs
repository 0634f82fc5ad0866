use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown scope: {0} (expected: organization|user)")]
    UnknownScope(String),

    #[error("invalid tag: {0} (expected: key=value)")]
    InvalidTag(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
