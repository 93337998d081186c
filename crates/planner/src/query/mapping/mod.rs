//! Resolution of mapped types and properties to SQL.
//!
//! The translator never reads the catalog directly: it goes through
//! [`SqlMapping`], which turns a property access on an alias into either a
//! value node or a new (or reused) alias reached through a join.

use crate::query::dml::{AliasId, DmlTree, NodeId, RequestId};
use model::{
    core::types::PropertyRef,
    error::MappingError,
    mapping::entity::PropertyMapping,
};
use std::sync::Arc;

pub mod default;
pub mod fragment;
pub mod mapper;

pub use default::DefaultSqlMapping;
pub use fragment::Fragment;
pub use mapper::{PropertyMapper, Record, ReferenceKeyMapper};

/// Result of resolving a property access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// A value: a column or a registered computed expression.
    Node(NodeId),
    /// A related row, reached through a join.
    Alias(AliasId),
}

pub trait SqlMapping: Send + Sync {
    /// Table name of a mapped entity.
    fn sql_equivalent_for_type(&self, entity: &str) -> Result<String, MappingError>;

    /// Resolves `owner.property` inside `request`. Navigations add a join
    /// to `request` unless an equivalent join already exists there; with
    /// `widen` set the join is (or becomes) a left join.
    fn sql_equivalent_for_property(
        &self,
        tree: &mut DmlTree,
        request: RequestId,
        owner: AliasId,
        property: &PropertyRef,
        widen: bool,
    ) -> Result<Resolved, MappingError>;

    /// Records the SQL expression a projected member was computed from, so
    /// later operators can refer to the member by name.
    fn register_sql_equivalent(&self, tree: &DmlTree, property: &PropertyRef, node: NodeId);

    fn column_name(&self, property: &PropertyRef) -> Result<String, MappingError>;

    fn id_property(&self, entity: &str) -> Result<PropertyRef, MappingError>;

    fn property_mapping(&self, property: &PropertyRef) -> Result<PropertyMapping, MappingError>;

    fn mapped_simple_properties(&self, entity: &str) -> Result<Vec<PropertyRef>, MappingError>;

    fn mapped_properties(&self, entity: &str) -> Result<Vec<PropertyRef>, MappingError>;

    /// Mapped entity names, in registration order.
    fn entity_names(&self) -> Vec<String>;

    fn custom_property_mappers(&self) -> &[Arc<dyn PropertyMapper>];
}
