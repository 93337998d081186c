#![allow(dead_code)]

use model::{
    core::{
        data_type::DataType,
        types::{PropertyRef, TypeRef},
    },
    mapping::{MappingCatalog, entity::EntityBuilder},
};
use planner::query::{
    dialect::Dialect,
    mapping::DefaultSqlMapping,
    renderer::{RenderedSql, SqlRenderer},
    translate::{Statement, translate},
};
use query_syntax::Expr;
use std::sync::Arc;

/// Orders with a customer, order lines and tags.
pub fn catalog() -> MappingCatalog {
    MappingCatalog::with_entities([
        EntityBuilder::new("Order")
            .id("Id", DataType::Int)
            .property("Reference", DataType::VarChar)
            .max_length(20)
            .add()
            .property("Total", DataType::Double)
            .add()
            .property("Shipped", DataType::Boolean)
            .add()
            .reference("Customer", "Customer")
            .add()
            .collection("Lines", "OrderLine")
            .add()
            .many_to_many("Tags", "Tag")
            .add()
            .build(),
        EntityBuilder::new("Customer")
            .id("Id", DataType::Int)
            .property("Name", DataType::VarChar)
            .add()
            .property("Active", DataType::Boolean)
            .add()
            .build(),
        EntityBuilder::new("OrderLine")
            .id("Id", DataType::Int)
            .property("Quantity", DataType::Int)
            .add()
            .build(),
        EntityBuilder::new("Tag")
            .id("Id", DataType::Int)
            .property("Label", DataType::VarChar)
            .add()
            .build(),
    ])
    .expect("valid catalog")
}

pub fn mapping() -> DefaultSqlMapping {
    DefaultSqlMapping::new(Arc::new(catalog()))
}

pub fn prop(mapping: &DefaultSqlMapping, owner: &str, name: &str) -> PropertyRef {
    mapping
        .catalog()
        .property(owner, name)
        .expect("mapped property")
}

/// A member of a projected, unmapped type.
pub fn dto(ty: &str, name: &str, data_type: DataType) -> PropertyRef {
    PropertyRef::new(ty, name, TypeRef::scalar(data_type))
}

pub fn compile(expr: &Expr, mapping: &DefaultSqlMapping) -> Statement {
    translate(expr, mapping).expect("query translates")
}

pub fn render(statement: &Statement, dialect: &dyn Dialect) -> RenderedSql {
    SqlRenderer::new(dialect).render(statement)
}

/// Columns selected for a whole `Order` row.
pub const ORDER_COLUMNS: &str =
    r#""t0"."ID", "t0"."REFERENCE", "t0"."TOTAL", "t0"."SHIPPED""#;
