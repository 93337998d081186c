use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The type has not been registered in the catalog.
    #[error("Type '{0}' is not mapped")]
    UnknownEntity(String),

    /// The property does not exist on a mapped type.
    #[error("Property '{0}' is not mapped")]
    UnknownProperty(String),

    /// Primary-key resolution failed.
    #[error("Type '{0}' has no id property")]
    MissingIdProperty(String),

    /// A navigation property points somewhere the catalog cannot follow.
    #[error("Invalid relation '{property}': {reason}")]
    InvalidRelation { property: String, reason: String },

    #[error("Type '{0}' is already mapped")]
    DuplicateEntity(String),
}
