//! Custom property mappers: the extension point for columns that are not a
//! plain one-to-one scalar mapping.

use crate::query::dml::{AliasId, DmlTree, Node, RequestId, SelectInfo};
use model::{
    core::{types::PropertyRef, value::Value},
    error::MappingError,
    mapping::{MappingCatalog, entity::PropertyKind},
};
use std::{collections::BTreeMap, sync::Arc};

/// A materialized object, keyed by property name.
pub type Record = BTreeMap<String, Value>;

/// Describes one column of a rendered result set.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub property: Option<PropertyRef>,
    /// The column starts a new object.
    pub new_element: bool,
}

pub trait PropertyMapper: Send + Sync {
    fn accepts(&self, property: &PropertyRef) -> bool;

    /// Adds the select items needed to read `property` of the row behind
    /// `alias`.
    fn declare_map(
        &self,
        tree: &mut DmlTree,
        request: RequestId,
        property: &PropertyRef,
        alias: AliasId,
        new_element: bool,
    ) -> Result<(), MappingError>;

    /// Fills `property` of `record` from `row` starting at `column_index`.
    /// Returns the number of columns consumed.
    fn populate(
        &self,
        record: &mut Record,
        property: &PropertyRef,
        row: &[Value],
        column_index: usize,
    ) -> Result<usize, MappingError>;
}

/// Reads the foreign-key value of many-to-one references, so a reference
/// can be loaded later without joining its table up front.
pub struct ReferenceKeyMapper {
    catalog: Arc<MappingCatalog>,
}

impl ReferenceKeyMapper {
    pub fn new(catalog: Arc<MappingCatalog>) -> Self {
        Self { catalog }
    }
}

impl PropertyMapper for ReferenceKeyMapper {
    fn accepts(&self, property: &PropertyRef) -> bool {
        self.catalog
            .property_mapping(property)
            .is_ok_and(|mapping| matches!(mapping.kind, PropertyKind::Reference { .. }))
    }

    fn declare_map(
        &self,
        tree: &mut DmlTree,
        request: RequestId,
        property: &PropertyRef,
        alias: AliasId,
        new_element: bool,
    ) -> Result<(), MappingError> {
        let column = self.catalog.column_name(property)?;
        let node = tree.add(Node::column(alias, &column));
        tree.push_select(
            request,
            SelectInfo::member(node, Some(property.clone()), new_element),
        );
        Ok(())
    }

    fn populate(
        &self,
        record: &mut Record,
        property: &PropertyRef,
        row: &[Value],
        column_index: usize,
    ) -> Result<usize, MappingError> {
        let value = row.get(column_index).ok_or_else(|| MappingError::InvalidRelation {
            property: property.to_string(),
            reason: format!("row has no column {column_index}"),
        })?;
        record.insert(property.name.clone(), value.clone());
        Ok(1)
    }
}

/// Splits a result row into the objects described by `layout`.
pub fn read_row(
    layout: &[ColumnLayout],
    row: &[Value],
    mappers: &[Arc<dyn PropertyMapper>],
) -> Result<Vec<Record>, MappingError> {
    let mut records: Vec<Record> = Vec::new();
    let mut index = 0;

    while index < layout.len() {
        let column = &layout[index];
        if column.new_element || records.is_empty() {
            records.push(Record::new());
        }
        let Some(record) = records.last_mut() else {
            break;
        };

        let Some(property) = &column.property else {
            if let Some(value) = row.get(index) {
                record.insert(format!("c{index}"), value.clone());
            }
            index += 1;
            continue;
        };

        match mappers.iter().find(|mapper| mapper.accepts(property)) {
            Some(mapper) => index += mapper.populate(record, property, row, index)?.max(1),
            None => {
                if let Some(value) = row.get(index) {
                    record.insert(property.name.clone(), value.clone());
                }
                index += 1;
            }
        }
    }
    Ok(records)
}
