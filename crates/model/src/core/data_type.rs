use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Short,
    Int,
    Long,
    Decimal,
    Float,
    Double,
    Char,
    VarChar,
    String,
    Date,
    Time,
    Timestamp,
    Uuid,
    Bytea,
    Json,
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlDialect {
    MySql,
    Postgres,
    SqlServer,
    Db2,
}

impl DataType {
    pub fn mysql_name(&self) -> Cow<'_, str> {
        match self {
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INT"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Decimal => Cow::Borrowed("DECIMAL"),
            DataType::Float => Cow::Borrowed("FLOAT"),
            DataType::Double => Cow::Borrowed("DOUBLE"),
            DataType::Char => Cow::Borrowed("CHAR"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::String => Cow::Borrowed("TEXT"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Time => Cow::Borrowed("TIME"),
            DataType::Timestamp => Cow::Borrowed("DATETIME"),
            DataType::Uuid => Cow::Borrowed("CHAR(36)"),
            DataType::Bytea => Cow::Borrowed("BLOB"),
            DataType::Json => Cow::Borrowed("JSON"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    pub fn postgres_name(&self) -> Cow<'_, str> {
        match self {
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Decimal => Cow::Borrowed("DECIMAL"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Double => Cow::Borrowed("DOUBLE PRECISION"),
            DataType::Char => Cow::Borrowed("CHAR"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::String => Cow::Borrowed("TEXT"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Time => Cow::Borrowed("TIME"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMP"),
            DataType::Uuid => Cow::Borrowed("UUID"),
            DataType::Bytea => Cow::Borrowed("BYTEA"),
            DataType::Json => Cow::Borrowed("JSONB"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    pub fn sqlserver_name(&self) -> Cow<'_, str> {
        match self {
            DataType::Boolean => Cow::Borrowed("BIT"),
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Decimal => Cow::Borrowed("DECIMAL"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Double => Cow::Borrowed("FLOAT"),
            DataType::Char => Cow::Borrowed("NCHAR"),
            DataType::VarChar => Cow::Borrowed("NVARCHAR"),
            DataType::String | DataType::Json => Cow::Borrowed("NVARCHAR(MAX)"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Time => Cow::Borrowed("TIME"),
            DataType::Timestamp => Cow::Borrowed("DATETIME2"),
            DataType::Uuid => Cow::Borrowed("UNIQUEIDENTIFIER"),
            DataType::Bytea => Cow::Borrowed("VARBINARY(MAX)"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    pub fn db2_name(&self) -> Cow<'_, str> {
        match self {
            DataType::Boolean => Cow::Borrowed("SMALLINT"),
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Decimal => Cow::Borrowed("DECIMAL"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Double => Cow::Borrowed("DOUBLE"),
            DataType::Char => Cow::Borrowed("NCHAR"),
            DataType::VarChar => Cow::Borrowed("NVARCHAR"),
            DataType::String | DataType::Json => Cow::Borrowed("CLOB"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Time => Cow::Borrowed("TIME"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMP"),
            DataType::Uuid => Cow::Borrowed("CHAR(36)"),
            DataType::Bytea => Cow::Borrowed("BLOB"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    pub fn name_for(&self, dialect: SqlDialect) -> Cow<'_, str> {
        match dialect {
            SqlDialect::MySql => self.mysql_name(),
            SqlDialect::Postgres => self.postgres_name(),
            SqlDialect::SqlServer => self.sqlserver_name(),
            SqlDialect::Db2 => self.db2_name(),
        }
    }

    pub fn supports_length(&self) -> bool {
        matches!(self, DataType::VarChar | DataType::Char)
    }

    /// Length used when a variable-length column declares none.
    ///
    /// PostgreSQL accepts an unbounded `VARCHAR`, the others do not.
    pub fn default_length(&self, dialect: SqlDialect) -> Option<usize> {
        match (self, dialect) {
            (DataType::VarChar, SqlDialect::MySql) => Some(255),
            (DataType::VarChar, SqlDialect::SqlServer | SqlDialect::Db2) => Some(100),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Short | DataType::Int | DataType::Long)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::Char | DataType::VarChar | DataType::String)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Custom(name) => write!(f, "{name}"),
            other => write!(f, "{other:?}"),
        }
    }
}
