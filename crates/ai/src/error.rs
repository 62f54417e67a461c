use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} is disabled in settings")]
    Disabled(&'static str),

    #[error("assistant unavailable: {0}")]
    Unavailable(String),

    #[error("unknown feature: {0}")]
    UnknownFeature(String),
}
