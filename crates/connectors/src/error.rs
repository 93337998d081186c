use planner::query::{DdlError, TranslateError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Missing or malformed provider configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration could not be deserialized.
    #[error("Failed to deserialize the provider configuration: {0}")]
    ConfigDeserialize(#[from] serde_json::Error),

    #[error("Failed to read the configuration file: {0}")]
    ConfigFileRead(#[from] std::io::Error),

    /// A factory was paired with a provider of another dialect.
    #[error("Dialect mismatch: expected {expected}, got {actual}")]
    DialectMismatch { expected: String, actual: String },

    /// MySQL driver error.
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// PostgreSQL driver error.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Translation failed: {0}")]
    Translate(#[from] TranslateError),

    #[error("DDL generation failed: {0}")]
    Ddl(#[from] DdlError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
