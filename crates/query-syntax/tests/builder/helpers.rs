use model::{
    core::{
        data_type::DataType,
        types::{PropertyRef, TypeRef},
    },
    mapping::{MappingCatalog, entity::EntityBuilder},
};

pub fn catalog() -> MappingCatalog {
    MappingCatalog::with_entities([
        EntityBuilder::new("Order")
            .id("Id", DataType::Int)
            .property("Total", DataType::Double)
            .add()
            .reference("Customer", "Customer")
            .add()
            .collection("Lines", "OrderLine")
            .add()
            .build(),
        EntityBuilder::new("Customer")
            .id("Id", DataType::Int)
            .property("Name", DataType::VarChar)
            .add()
            .build(),
        EntityBuilder::new("OrderLine")
            .id("Id", DataType::Int)
            .property("Quantity", DataType::Int)
            .add()
            .build(),
    ])
    .expect("valid catalog")
}

pub fn prop(catalog: &MappingCatalog, owner: &str, name: &str) -> PropertyRef {
    catalog.property(owner, name).expect("mapped property")
}

pub fn dto(name: &str, ty: TypeRef) -> PropertyRef {
    PropertyRef::new("OrderSummary", name, ty)
}
