use async_trait::async_trait;
use connectors::{ConnectionFactory, ConnectorError, Provider, ProviderConfig};
use model::{
    core::data_type::DataType,
    mapping::{MappingCatalog, entity::EntityBuilder},
};
use planner::query::{DdlStatement, dialect::DialectKind, mapping::DefaultSqlMapping};
use query_syntax::builder::{constant, source};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Hands out connection numbers; stands in for a SQL Server driver.
#[derive(Default)]
struct CountingFactory {
    opened: AtomicUsize,
}

#[async_trait]
impl ConnectionFactory for CountingFactory {
    type Connection = usize;

    fn dialect(&self) -> DialectKind {
        DialectKind::SqlServer
    }

    async fn connect(&self) -> Result<usize, ConnectorError> {
        Ok(self.opened.fetch_add(1, Ordering::SeqCst))
    }

    async fn ping(&self) -> Result<(), ConnectorError> {
        self.connect().await.map(|_| ())
    }
}

fn mapping() -> DefaultSqlMapping {
    let catalog = MappingCatalog::with_entities([EntityBuilder::new("Product")
        .id("Id", DataType::Int)
        .property("Name", DataType::VarChar)
        .add()
        .property("Price", DataType::Double)
        .add()
        .build()])
    .expect("valid catalog");
    DefaultSqlMapping::new(Arc::new(catalog))
}

#[tokio::test]
async fn test_caller_supplied_factory() {
    let provider = Provider::new(DialectKind::SqlServer, CountingFactory::default()).unwrap();

    assert_eq!(provider.connect().await.unwrap(), 0);
    assert_eq!(provider.connect().await.unwrap(), 1);
    provider.connection_factory().ping().await.unwrap();
    assert_eq!(provider.dialect().name(), "SQL Server");
}

#[test]
fn test_compile_renders_for_the_provider_dialect() {
    let mapping = mapping();
    let price = mapping.catalog().property("Product", "Price").unwrap();
    let query = source("Product")
        .filter("p", |p| p.member(&price).lt(constant(5.0)))
        .take(3);

    let provider = Provider::new(DialectKind::SqlServer, CountingFactory::default()).unwrap();
    let rendered = provider.compile(&query, &mapping).unwrap();

    assert_eq!(
        rendered.sql,
        "SELECT TOP (3) [t0].[ID], [t0].[NAME], [t0].[PRICE] FROM [PRODUCT] AS [t0] WHERE ([t0].[PRICE] < @P1)"
    );
    assert_eq!(rendered.layout.len(), 3);
}

#[test]
fn test_compile_surfaces_translation_errors() {
    let provider = Provider::new(DialectKind::SqlServer, CountingFactory::default()).unwrap();
    let result = provider.compile(&constant(1), &mapping());
    assert!(matches!(result, Err(ConnectorError::Translate(_))));
}

#[test]
fn test_ddl_translator_follows_the_dialect() {
    let provider = Provider::new(DialectKind::SqlServer, CountingFactory::default()).unwrap();

    let mut objects = Vec::new();
    provider
        .ddl_translator()
        .translate(
            &DdlStatement::create_table("Product"),
            &mapping(),
            &mut objects,
            &mut Vec::new(),
        )
        .unwrap();

    assert_eq!(
        objects,
        vec![
            "CREATE TABLE [PRODUCT] (\n\t[ID] INTEGER NOT NULL IDENTITY PRIMARY KEY,\n\t[NAME] NVARCHAR(100) NOT NULL,\n\t[PRICE] FLOAT NOT NULL\n)"
                .to_string()
        ]
    );
}

#[test]
fn test_factory_of_another_dialect_is_rejected() {
    let result = Provider::new(DialectKind::Db2, CountingFactory::default());
    assert!(matches!(
        result,
        Err(ConnectorError::DialectMismatch { .. })
    ));
}

#[test]
fn test_postgres_provider_from_config() {
    let config = ProviderConfig::from_json(
        r#"{ "dialect": "postgresql", "connection_string": "host=localhost user=postgres" }"#,
    )
    .unwrap();
    let provider = Provider::postgres(&config).unwrap();
    assert_eq!(provider.kind(), DialectKind::Postgres);

    let config = ProviderConfig::new(DialectKind::MySql, "host=localhost");
    assert!(Provider::postgres(&config).is_err());
}

#[tokio::test]
async fn test_mysql_provider_from_config() {
    let config = ProviderConfig::new(DialectKind::MySql, "mysql://root@localhost:3306/shop");
    let provider = Provider::mysql(&config).unwrap();
    assert_eq!(provider.kind(), DialectKind::MySql);
}
