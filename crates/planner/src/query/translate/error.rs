use model::error::MappingError;
use query_syntax::{Expr, error::SyntaxError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// The expression uses an operator or shape outside the supported surface.
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// The expression is well-formed but contradicts the mapping metadata.
    #[error("Mapping violation: {0}")]
    MappingViolation(String),

    /// A required argument is missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TranslateError {
    pub fn unsupported(expr: &Expr, reason: &str) -> Self {
        TranslateError::UnsupportedConstruct(format!("{reason}: {expr}"))
    }

    pub fn violation(expr: &Expr, reason: &str) -> Self {
        TranslateError::MappingViolation(format!("{reason}: {expr}"))
    }

    pub fn invalid(expr: &Expr, reason: &str) -> Self {
        TranslateError::InvalidArgument(format!("{reason}: {expr}"))
    }
}

impl From<MappingError> for TranslateError {
    fn from(err: MappingError) -> Self {
        TranslateError::MappingViolation(err.to_string())
    }
}

impl From<SyntaxError> for TranslateError {
    fn from(err: SyntaxError) -> Self {
        TranslateError::InvalidArgument(err.to_string())
    }
}
