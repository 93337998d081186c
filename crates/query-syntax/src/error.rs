use model::error::MappingError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A dotted property path with an empty or dangling segment.
    #[error("Malformed property path '{0}'")]
    MalformedPath(String),

    /// A path segment that does not exist on the type it is applied to.
    #[error("Type '{ty}' has no member '{member}'")]
    UnknownMember { ty: String, member: String },

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
}
