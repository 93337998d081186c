//! Provides a fluent builder for constructing `CreateTable` ASTs.

use crate::query::ast::{
    common::TableRef,
    create_table::{ColumnDef, ColumnReference, CreateTable, TableConstraint},
};
use model::core::{data_type::DataType, value::Value};

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    ast: CreateTable,
}

impl CreateTableBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: CreateTable {
                table,
                ..Default::default()
            },
        }
    }

    pub fn column(self, name: &str, data_type: DataType, max_length: Option<usize>) -> ColumnBuilder {
        ColumnBuilder::new(self, name, data_type, max_length)
    }

    pub fn add_column(mut self, column: ColumnDef) -> Self {
        self.ast.columns.push(column);
        self
    }

    pub fn primary_key(mut self, columns: Vec<String>) -> Self {
        self.ast
            .constraints
            .push(TableConstraint::PrimaryKey { columns });
        self
    }

    pub fn build(self) -> CreateTable {
        self.ast
    }
}

/// Builds a single column. Columns are NOT NULL unless marked nullable.
pub struct ColumnBuilder {
    table_builder: CreateTableBuilder,
    column: ColumnDef,
}

impl ColumnBuilder {
    pub fn new(
        table_builder: CreateTableBuilder,
        name: &str,
        data_type: DataType,
        max_length: Option<usize>,
    ) -> Self {
        Self {
            table_builder,
            column: column_def(name, data_type, max_length),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.column.is_nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.column.is_primary_key = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.column.is_identity = true;
        self.column.is_primary_key = true;
        self
    }

    pub fn references(mut self, table: TableRef, column: &str) -> Self {
        self.column.references = Some(ColumnReference {
            table,
            column: column.to_string(),
        });
        self
    }

    pub fn default_value(mut self, default_value: Value) -> Self {
        self.column.default_value = Some(default_value);
        self
    }

    pub fn add(mut self) -> CreateTableBuilder {
        self.table_builder.ast.columns.push(self.column);
        self.table_builder
    }
}

/// A NOT NULL column with no constraints.
pub fn column_def(name: &str, data_type: DataType, max_length: Option<usize>) -> ColumnDef {
    ColumnDef {
        name: name.to_string(),
        data_type,
        is_nullable: false,
        is_primary_key: false,
        is_identity: false,
        default_value: None,
        max_length,
        references: None,
    }
}
