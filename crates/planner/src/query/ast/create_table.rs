//! Defines the AST for a CREATE TABLE statement.

use crate::query::ast::common::TableRef;
use model::core::{data_type::DataType, value::Value};

/// Represents a complete CREATE TABLE statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTable {
    pub table: TableRef,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    /// Database-generated integer key. Implies primary key and NOT NULL.
    pub is_identity: bool,
    pub default_value: Option<Value>,
    pub max_length: Option<usize>,
    /// Inline `REFERENCES table (column)`.
    pub references: Option<ColumnReference>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReference {
    pub table: TableRef,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey {
        columns: Vec<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        references: TableRef,
        referenced_columns: Vec<String>,
    },
}
