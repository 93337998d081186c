//! Defines the `Dialect` trait for database-specific SQL syntax.
//!
//! The rendering strategy is shared; a dialect only answers lexical
//! questions: how to quote, how to page, how to concatenate, which
//! statement form to use for joined UPDATE/DELETE.

use model::core::data_type::{DataType, SqlDialect};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub mod db2;
pub mod mysql;
pub mod postgres;
pub mod sqlserver;

pub use db2::Db2;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlserver::SqlServer;

/// Statement form used for UPDATE and DELETE over joined requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlStyle {
    /// `UPDATE t AS a SET .. WHERE a.id IN (SELECT ..)`
    Subquery,
    /// `UPDATE t AS a INNER JOIN .. SET a.c = ..`, `DELETE a FROM t AS a ..`
    JoinedTarget,
    /// `UPDATE a SET c = .. FROM t AS a ..`, `DELETE a FROM t AS a ..`
    FromClause,
}

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for the parameter at `index` (zero-based).
    fn get_placeholder(&self, index: usize) -> String;

    /// Renders a generic `DataType` into a database-specific SQL type string.
    fn render_data_type(&self, data_type: &DataType, max_length: Option<usize>) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL", "MySQL").
    fn name(&self) -> String;

    fn kind(&self) -> DialectKind;

    /// Column definition tail of a database-generated integer key,
    /// following the type name.
    fn identity_clause(&self) -> &'static str;

    /// Prefix, separator and suffix of a two-operand string concatenation.
    fn concat_tokens(&self) -> (&'static str, &'static str, &'static str) {
        ("(", " || ", ")")
    }

    fn cast(&self, expr: &str, data_type: &DataType) -> String {
        format!("CAST({expr} AS {})", self.render_data_type(data_type, None))
    }

    /// Whether bare parameters need an explicit type where the server
    /// cannot infer one (concatenations and projected constants).
    fn types_bare_parameters(&self) -> bool {
        false
    }

    /// `TOP` style row limit rendered right after `SELECT [DISTINCT]`.
    fn top_clause(&self, _skip: Option<u64>, _take: Option<u64>) -> Option<String> {
        None
    }

    /// Appends the trailing paging clauses of a SELECT.
    fn render_pagination(&self, sql: &mut String, skip: Option<u64>, take: Option<u64>, _ordered: bool) {
        if let Some(take) = take {
            sql.push_str(&format!(" LIMIT {take}"));
        }
        if let Some(skip) = skip {
            sql.push_str(&format!(" OFFSET {skip}"));
        }
    }

    /// Table to select from when a statement has no FROM source.
    fn dummy_table(&self) -> Option<&'static str> {
        None
    }

    fn dml_style(&self) -> DmlStyle {
        DmlStyle::Subquery
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD COLUMN"
    }
}

/// Applies a dialect's default length to variable-length types.
pub(crate) fn render_sized_type(
    data_type: &DataType,
    max_length: Option<usize>,
    dialect: SqlDialect,
) -> String {
    let type_name = data_type.name_for(dialect).into_owned();
    let length = max_length.or_else(|| data_type.default_length(dialect));
    match length {
        Some(length) if data_type.supports_length() => format!("{type_name}({length})"),
        _ => type_name,
    }
}

/// Names a supported dialect; parsed from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[serde(alias = "pg", alias = "postgresql")]
    Postgres,
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "mssql")]
    SqlServer,
    #[serde(alias = "iseries")]
    Db2,
}

impl DialectKind {
    pub fn dialect(&self) -> Box<dyn Dialect> {
        match self {
            DialectKind::Postgres => Box::new(Postgres),
            DialectKind::MySql => Box::new(MySql),
            DialectKind::SqlServer => Box::new(SqlServer),
            DialectKind::Db2 => Box::new(Db2),
        }
    }

    pub fn sql_dialect(&self) -> SqlDialect {
        match self {
            DialectKind::Postgres => SqlDialect::Postgres,
            DialectKind::MySql => SqlDialect::MySql,
            DialectKind::SqlServer => SqlDialect::SqlServer,
            DialectKind::Db2 => SqlDialect::Db2,
        }
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pg" | "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            "sqlserver" | "mssql" => Ok(DialectKind::SqlServer),
            "db2" | "iseries" => Ok(DialectKind::Db2),
            _ => Err(format!("Unsupported dialect: {s}")),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialectKind::Postgres => "postgres",
            DialectKind::MySql => "mysql",
            DialectKind::SqlServer => "sqlserver",
            DialectKind::Db2 => "db2",
        };
        write!(f, "{name}")
    }
}
