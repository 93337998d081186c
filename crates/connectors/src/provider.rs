//! Per-dialect bundle of a connection factory, a SQL renderer and a DDL
//! translator.

use crate::{
    config::ProviderConfig,
    error::ConnectorError,
    factory::{ConnectionFactory, MySqlConnectionFactory, PgConnectionFactory},
};
use planner::query::{
    DdlTranslator, RenderedSql, SqlRenderer,
    dialect::{Dialect, DialectKind},
    mapping::SqlMapping,
    translate,
};
use query_syntax::Expr;
use tracing::debug;

pub struct Provider<F> {
    kind: DialectKind,
    dialect: Box<dyn Dialect>,
    ddl_translator: DdlTranslator,
    connection_factory: F,
}

impl<F: ConnectionFactory> Provider<F> {
    /// Fails when the factory connects to a server of another dialect.
    pub fn new(kind: DialectKind, connection_factory: F) -> Result<Self, ConnectorError> {
        if connection_factory.dialect() != kind {
            return Err(ConnectorError::DialectMismatch {
                expected: kind.to_string(),
                actual: connection_factory.dialect().to_string(),
            });
        }
        Ok(Self {
            kind,
            dialect: kind.dialect(),
            ddl_translator: DdlTranslator::for_kind(kind),
            connection_factory,
        })
    }

    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn connection_factory(&self) -> &F {
        &self.connection_factory
    }

    pub fn sql_renderer(&self) -> SqlRenderer<'_> {
        SqlRenderer::new(self.dialect.as_ref())
    }

    pub fn ddl_translator(&self) -> &DdlTranslator {
        &self.ddl_translator
    }

    /// Translates a typed query and renders it for this provider's dialect.
    pub fn compile(&self, expr: &Expr, mapping: &dyn SqlMapping) -> Result<RenderedSql, ConnectorError> {
        let statement = translate(expr, mapping)?;
        let rendered = self.sql_renderer().render(&statement);
        debug!("Compiled for {}: {}", self.dialect.name(), rendered.sql);
        Ok(rendered)
    }

    pub async fn connect(&self) -> Result<F::Connection, ConnectorError> {
        self.connection_factory.connect().await
    }
}

impl Provider<PgConnectionFactory> {
    pub fn postgres(config: &ProviderConfig) -> Result<Self, ConnectorError> {
        let factory = PgConnectionFactory::new(&config.connection_string);
        Provider::new(config.dialect, factory)
    }
}

impl Provider<MySqlConnectionFactory> {
    pub fn mysql(config: &ProviderConfig) -> Result<Self, ConnectorError> {
        let factory = MySqlConnectionFactory::new(&config.connection_string)?;
        Provider::new(config.dialect, factory)
    }
}
