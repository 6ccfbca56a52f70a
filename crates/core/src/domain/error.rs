// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Missing payload field: {0}")]
    MissingField(&'static str),

    #[error("Empty payload field: {0}")]
    EmptyField(&'static str),

    #[error("Unknown payload field: {0}")]
    UnknownField(String),

    #[error("Duplicate payload field: {0}")]
    DuplicateField(String),

    #[error("Form encoding error: {0}")]
    Encoding(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
