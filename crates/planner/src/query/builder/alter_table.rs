//! Provides a fluent builder for constructing `AlterTable` ASTs.

use crate::query::{
    ast::{
        alter_table::{AlterTable, AlterTableOperation},
        common::TableRef,
        create_table::{ColumnDef, ColumnReference, TableConstraint},
    },
    builder::create_table::column_def,
};
use model::core::data_type::DataType;

#[derive(Debug, Clone)]
pub struct AlterTableBuilder {
    ast: AlterTable,
}

impl AlterTableBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: AlterTable {
                table,
                ..Default::default()
            },
        }
    }

    pub fn add_column(self, name: &str, data_type: DataType) -> AddColumnBuilder {
        AddColumnBuilder::new(self, name, data_type)
    }

    pub fn add_column_def(mut self, column: ColumnDef) -> Self {
        self.ast
            .operations
            .push(AlterTableOperation::AddColumn(column));
        self
    }

    pub fn add_foreign_key(
        mut self,
        columns: &[&str],
        references: TableRef,
        referenced_columns: &[&str],
    ) -> Self {
        self.ast.operations.push(AlterTableOperation::AddConstraint(
            TableConstraint::ForeignKey {
                columns: columns.iter().map(|s| s.to_string()).collect(),
                references,
                referenced_columns: referenced_columns.iter().map(|s| s.to_string()).collect(),
            },
        ));
        self
    }

    pub fn build(self) -> AlterTable {
        self.ast
    }
}

pub struct AddColumnBuilder {
    table_builder: AlterTableBuilder,
    column: ColumnDef,
}

impl AddColumnBuilder {
    pub fn new(table_builder: AlterTableBuilder, name: &str, data_type: DataType) -> Self {
        Self {
            table_builder,
            column: column_def(name, data_type, None),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.column.is_nullable = true;
        self
    }

    pub fn references(mut self, table: TableRef, column: &str) -> Self {
        self.column.references = Some(ColumnReference {
            table,
            column: column.to_string(),
        });
        self
    }

    pub fn add(mut self) -> AlterTableBuilder {
        self.table_builder
            .ast
            .operations
            .push(AlterTableOperation::AddColumn(self.column));
        self.table_builder
    }
}
