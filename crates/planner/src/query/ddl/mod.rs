//! Schema generation for mapped types.
//!
//! Every statement lands in one of two lists: object scripts (CREATE TABLE,
//! ADD COLUMN on the owner) and constraint scripts (foreign keys added to
//! other tables, link tables). Callers run all object scripts before any
//! constraint script.

use crate::{
    query::{
        ast::{
            alter_table::AlterTable,
            create_table::{ColumnDef, ColumnReference},
        },
        builder::{
            alter_table::AlterTableBuilder,
            create_table::{CreateTableBuilder, column_def},
        },
        dialect::{Dialect, DialectKind},
        mapping::SqlMapping,
        renderer::{Render, Renderer},
    },
    table_ref,
};
use model::{
    core::{data_type::DataType, types::PropertyRef},
    error::MappingError,
    mapping::entity::{PropertyKind, PropertyMapping},
};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DdlError {
    /// A type or property the statement needs is not mapped.
    #[error("Mapping violation: {0}")]
    Mapping(#[from] MappingError),

    #[error("Unsupported DDL statement: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlStatementKind {
    CreateTable,
    AddColumn,
}

/// What to generate: a whole table, or one property added to an existing
/// table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlStatement {
    pub kind: DdlStatementKind,
    pub entity: String,
    pub property: Option<String>,
}

impl DdlStatement {
    pub fn create_table(entity: &str) -> Self {
        Self {
            kind: DdlStatementKind::CreateTable,
            entity: entity.to_string(),
            property: None,
        }
    }

    pub fn add_column(entity: &str, property: &str) -> Self {
        Self {
            kind: DdlStatementKind::AddColumn,
            entity: entity.to_string(),
            property: Some(property.to_string()),
        }
    }
}

/// Ordered scripts of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DdlScript {
    pub objects: Vec<String>,
    pub constraints: Vec<String>,
}

impl DdlScript {
    /// All statements in execution order.
    pub fn statements(&self) -> impl Iterator<Item = &String> {
        self.objects.iter().chain(self.constraints.iter())
    }
}

/// Key column of a mapped type, as seen from a referencing column.
struct KeyColumn {
    table: String,
    column: String,
    data_type: DataType,
    max_length: Option<usize>,
}

pub struct DdlTranslator {
    dialect: Box<dyn Dialect>,
}

impl DdlTranslator {
    pub fn new(dialect: Box<dyn Dialect>) -> Self {
        Self { dialect }
    }

    pub fn for_kind(kind: DialectKind) -> Self {
        Self::new(kind.dialect())
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Appends the scripts of `statement` to `objects` and `constraints`.
    pub fn translate(
        &self,
        statement: &DdlStatement,
        mapping: &dyn SqlMapping,
        objects: &mut Vec<String>,
        constraints: &mut Vec<String>,
    ) -> Result<(), DdlError> {
        match statement.kind {
            DdlStatementKind::CreateTable => {
                self.create_table(&statement.entity, mapping, objects, constraints)
            }
            DdlStatementKind::AddColumn => {
                let Some(property) = &statement.property else {
                    return Err(DdlError::Unsupported(format!(
                        "AddColumn on '{}' names no property",
                        statement.entity
                    )));
                };
                self.add_column(&statement.entity, property, mapping, objects, constraints)
            }
        }
    }

    /// CREATE TABLE scripts for `entities`, parents and referenced types
    /// first, then every constraint script.
    pub fn plan(&self, entities: &[String], mapping: &dyn SqlMapping) -> Result<DdlScript, DdlError> {
        let order = creation_order(entities, mapping)?;

        let mut objects = Vec::new();
        let mut constraints = Vec::new();
        for entity in &order {
            let statement = DdlStatement::create_table(entity);
            self.translate(&statement, mapping, &mut objects, &mut constraints)?;
        }

        let mut seen = HashSet::new();
        constraints.retain(|script| seen.insert(script.clone()));

        for script in objects.iter().chain(constraints.iter()) {
            info!("Planned: {script}");
        }
        Ok(DdlScript {
            objects,
            constraints,
        })
    }

    fn create_table(
        &self,
        entity: &str,
        mapping: &dyn SqlMapping,
        objects: &mut Vec<String>,
        constraints: &mut Vec<String>,
    ) -> Result<(), DdlError> {
        let table = mapping.sql_equivalent_for_type(entity)?;
        let id = mapping.id_property(entity).ok();
        let mut builder = CreateTableBuilder::new(table_ref!(table));

        for property in mapping.mapped_properties(entity)? {
            let property_mapping = mapping.property_mapping(&property)?;
            let is_id = id.as_ref() == Some(&property);
            match self.column_for(entity, &property_mapping, is_id, mapping)? {
                Some(column) => builder = builder.add_column(column),
                None => constraints.extend(self.relation_scripts(
                    entity,
                    &property,
                    &property_mapping,
                    mapping,
                )?),
            }
        }

        objects.push(self.render(&builder.build()));
        Ok(())
    }

    fn add_column(
        &self,
        entity: &str,
        property: &str,
        mapping: &dyn SqlMapping,
        objects: &mut Vec<String>,
        constraints: &mut Vec<String>,
    ) -> Result<(), DdlError> {
        let property = mapping
            .mapped_properties(entity)?
            .into_iter()
            .find(|p| p.name == property)
            .ok_or_else(|| MappingError::UnknownProperty(format!("{entity}.{property}")))?;
        let property_mapping = mapping.property_mapping(&property)?;
        let is_id = mapping.id_property(entity).ok().as_ref() == Some(&property);

        match self.column_for(entity, &property_mapping, is_id, mapping)? {
            Some(column) => {
                let table = mapping.sql_equivalent_for_type(entity)?;
                let ast = AlterTableBuilder::new(table_ref!(table))
                    .add_column_def(column)
                    .build();
                objects.push(self.render(&ast));
            }
            None => {
                constraints.extend(self.relation_scripts(entity, &property, &property_mapping, mapping)?)
            }
        }
        Ok(())
    }

    /// The inline column of a property on its owner's table, if it has one.
    fn column_for(
        &self,
        entity: &str,
        property: &PropertyMapping,
        is_id: bool,
        mapping: &dyn SqlMapping,
    ) -> Result<Option<ColumnDef>, DdlError> {
        match &property.kind {
            PropertyKind::Scalar {
                data_type,
                nullable,
                max_length,
            } => {
                let mut column = column_def(&property.column, data_type.clone(), *max_length);
                if is_id {
                    column.is_primary_key = true;
                    column.is_identity = data_type.is_integer();
                } else {
                    column.is_nullable = *nullable;
                }
                Ok(Some(column))
            }
            PropertyKind::Reference { target } => {
                let key = key_column(target, mapping)?;
                let mut column = column_def(&property.column, key.data_type, key.max_length);
                column.is_nullable = true;
                column.references = Some(ColumnReference {
                    table: table_ref!(key.table),
                    column: key.column,
                });
                Ok(Some(column))
            }
            PropertyKind::Collection { .. } | PropertyKind::ManyToMany { .. } => {
                if is_id {
                    return Err(DdlError::Unsupported(format!(
                        "The id of '{entity}' cannot be a collection"
                    )));
                }
                Ok(None)
            }
        }
    }

    /// Scripts for relations stored outside the owner's table.
    fn relation_scripts(
        &self,
        entity: &str,
        property: &PropertyRef,
        property_mapping: &PropertyMapping,
        mapping: &dyn SqlMapping,
    ) -> Result<Vec<String>, DdlError> {
        match &property_mapping.kind {
            PropertyKind::Collection { target } => {
                let owner_key = key_column(entity, mapping)?;
                let child_table = mapping.sql_equivalent_for_type(target)?;
                let ast: AlterTable = AlterTableBuilder::new(table_ref!(child_table))
                    .add_column(&property_mapping.column, owner_key.data_type)
                    .nullable()
                    .references(table_ref!(owner_key.table), &owner_key.column)
                    .add()
                    .build();
                Ok(vec![self.render(&ast)])
            }
            PropertyKind::ManyToMany {
                target,
                link_table,
                owner_column,
                target_column,
            } => {
                let owner_key = key_column(entity, mapping)?;
                let target_key = key_column(target, mapping)?;
                let ast = CreateTableBuilder::new(table_ref!(link_table))
                    .column(owner_column, owner_key.data_type, owner_key.max_length)
                    .references(table_ref!(owner_key.table), &owner_key.column)
                    .add()
                    .column(target_column, target_key.data_type, target_key.max_length)
                    .references(table_ref!(target_key.table), &target_key.column)
                    .add()
                    .primary_key(vec![owner_column.clone(), target_column.clone()])
                    .build();
                Ok(vec![self.render(&ast)])
            }
            PropertyKind::Scalar { .. } | PropertyKind::Reference { .. } => Err(
                DdlError::Unsupported(format!("'{property}' is stored inline")),
            ),
        }
    }

    fn render(&self, ast: &dyn Render) -> String {
        let mut renderer = Renderer::new(self.dialect.as_ref());
        ast.render(&mut renderer);
        renderer.finish().0
    }
}

fn key_column(entity: &str, mapping: &dyn SqlMapping) -> Result<KeyColumn, DdlError> {
    let id = mapping.id_property(entity)?;
    let id_mapping = mapping.property_mapping(&id)?;
    let PropertyKind::Scalar {
        data_type,
        max_length,
        ..
    } = id_mapping.kind
    else {
        return Err(MappingError::InvalidRelation {
            property: id.to_string(),
            reason: "an id property must be a scalar".to_string(),
        }
        .into());
    };
    Ok(KeyColumn {
        table: mapping.sql_equivalent_for_type(entity)?,
        column: id_mapping.column,
        data_type,
        max_length,
    })
}

/// Stable topological order of `entities`: referenced types and one-to-many
/// parents come before the types that point at them. Cycles fall back to
/// input order.
fn creation_order(entities: &[String], mapping: &dyn SqlMapping) -> Result<Vec<String>, DdlError> {
    let planned: HashSet<&str> = entities.iter().map(String::as_str).collect();
    let mut dependencies: Vec<HashSet<String>> = vec![HashSet::new(); entities.len()];

    for (index, entity) in entities.iter().enumerate() {
        for property in mapping.mapped_properties(entity)? {
            let property_mapping = mapping.property_mapping(&property)?;
            match &property_mapping.kind {
                PropertyKind::Reference { target } if target != entity && planned.contains(target.as_str()) => {
                    dependencies[index].insert(target.clone());
                }
                PropertyKind::Collection { target } if target != entity => {
                    if let Some(child) = entities.iter().position(|e| e == target) {
                        dependencies[child].insert(entity.clone());
                    }
                }
                _ => {}
            }
        }
    }

    let mut done: HashSet<String> = HashSet::new();
    let mut order = Vec::with_capacity(entities.len());
    while order.len() < entities.len() {
        let ready = entities.iter().enumerate().find(|(index, entity)| {
            !done.contains(entity.as_str()) && dependencies[*index].iter().all(|d| done.contains(d))
        });
        let next = match ready {
            Some((_, entity)) => entity.clone(),
            None => {
                let Some(entity) = entities.iter().find(|e| !done.contains(e.as_str())) else {
                    break;
                };
                warn!("Reference cycle through '{entity}', keeping declaration order");
                entity.clone()
            }
        };
        done.insert(next.clone());
        order.push(next);
    }
    Ok(order)
}
