//! Connection factories handed out by a provider.

use crate::error::ConnectorError;
use async_trait::async_trait;
use mysql_async::prelude::*;
use planner::query::dialect::DialectKind;
use tokio_postgres::NoTls;
use tracing::{error, info};

/// Opens connections to one database server.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    type Connection: Send;

    /// Dialect of the server this factory connects to.
    fn dialect(&self) -> DialectKind;

    async fn connect(&self) -> Result<Self::Connection, ConnectorError>;

    /// Opens a connection and runs `SELECT 1`; returns Err if unreachable.
    async fn ping(&self) -> Result<(), ConnectorError>;
}

pub struct PgConnectionFactory {
    conn_str: String,
}

impl PgConnectionFactory {
    pub fn new(conn_str: &str) -> Self {
        Self {
            conn_str: conn_str.to_string(),
        }
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    type Connection = tokio_postgres::Client;

    fn dialect(&self) -> DialectKind {
        DialectKind::Postgres
    }

    async fn connect(&self) -> Result<tokio_postgres::Client, ConnectorError> {
        info!("Connecting to Postgres at '{}'", &self.conn_str);

        let (client, connection) = tokio_postgres::connect(&self.conn_str, NoTls)
            .await
            .map_err(|e| {
                error!("Postgres connection to '{}' failed: {}", &self.conn_str, e);
                ConnectorError::Postgres(e)
            })?;

        // the connection drives the socket until the client is dropped
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Postgres connection error: {}", e);
            }
        });

        info!("Connected to Postgres at '{}'", &self.conn_str);
        Ok(client)
    }

    async fn ping(&self) -> Result<(), ConnectorError> {
        let client = self.connect().await?;
        let row = client.query_one("SELECT 1", &[]).await.map_err(|e| {
            error!("Postgres ping query on '{}' failed: {}", &self.conn_str, e);
            ConnectorError::Postgres(e)
        })?;

        let val: i32 = row.get(0);
        if val != 1 {
            let msg = format!(
                "Postgres ping to '{}' returned unexpected result: {}",
                &self.conn_str, val
            );
            error!("{}", msg);
            return Err(ConnectorError::Unexpected(msg));
        }

        info!("Postgres ping to '{}' succeeded", &self.conn_str);
        Ok(())
    }
}

/// MySQL/MariaDB connections drawn from a shared pool.
pub struct MySqlConnectionFactory {
    conn_str: String,
    pool: mysql_async::Pool,
}

impl MySqlConnectionFactory {
    pub fn new(conn_str: &str) -> Result<Self, ConnectorError> {
        let opts = mysql_async::Opts::from_url(conn_str).map_err(|e| {
            error!("MySQL connection string parse failed: {}", e);
            ConnectorError::MySql(mysql_async::Error::Url(e))
        })?;
        Ok(Self {
            conn_str: conn_str.to_string(),
            pool: mysql_async::Pool::new(opts),
        })
    }

    /// Closes the pool once every connection is returned.
    pub async fn disconnect(self) -> Result<(), ConnectorError> {
        self.pool.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl ConnectionFactory for MySqlConnectionFactory {
    type Connection = mysql_async::Conn;

    fn dialect(&self) -> DialectKind {
        DialectKind::MySql
    }

    async fn connect(&self) -> Result<mysql_async::Conn, ConnectorError> {
        info!("Connecting to MySQL at '{}'", &self.conn_str);
        let conn = self.pool.get_conn().await.map_err(|e| {
            error!("MySQL connection to '{}' failed: {}", &self.conn_str, e);
            ConnectorError::MySql(e)
        })?;
        info!("Connected to MySQL at '{}'", &self.conn_str);
        Ok(conn)
    }

    async fn ping(&self) -> Result<(), ConnectorError> {
        let mut conn = self.connect().await?;

        let val: i32 = conn
            .query_first("SELECT 1")
            .await
            .map_err(|e| {
                error!("MySQL ping query on '{}' failed: {}", &self.conn_str, e);
                ConnectorError::MySql(e)
            })?
            .ok_or_else(|| {
                let msg = format!("MySQL ping to '{}' returned no result", &self.conn_str);
                error!("{}", msg);
                ConnectorError::Unexpected(msg)
            })?;

        if val != 1 {
            let msg = format!(
                "MySQL ping to '{}' returned unexpected result: {}",
                &self.conn_str, val
            );
            error!("{}", msg);
            return Err(ConnectorError::Unexpected(msg));
        }

        info!("MySQL ping to '{}' succeeded", &self.conn_str);
        Ok(())
    }
}
