pub mod config;
pub mod error;
pub mod factory;
pub mod provider;

pub use config::ProviderConfig;
pub use error::ConnectorError;
pub use factory::{ConnectionFactory, MySqlConnectionFactory, PgConnectionFactory};
pub use provider::Provider;
