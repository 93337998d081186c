use crate::{
    core::{
        data_type::DataType,
        types::{PropertyRef, TypeRef},
    },
    mapping::naming,
};
use serde::{Deserialize, Serialize};

/// How a mapped property is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Scalar {
        data_type: DataType,
        nullable: bool,
        max_length: Option<usize>,
    },
    /// Many-to-one: an inline foreign-key column on the owner's table.
    Reference { target: String },
    /// One-to-many: the foreign-key column lives on the target's table.
    Collection { target: String },
    /// Many-to-many through a link table.
    ManyToMany {
        target: String,
        link_table: String,
        owner_column: String,
        target_column: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMapping {
    pub name: String,
    /// The column on the owner's table, or on the child table for
    /// one-to-many collections. Unused for many-to-many.
    pub column: String,
    pub kind: PropertyKind,
}

impl PropertyMapping {
    pub fn ty(&self) -> TypeRef {
        match &self.kind {
            PropertyKind::Scalar {
                data_type,
                nullable,
                ..
            } => TypeRef::Scalar {
                data_type: data_type.clone(),
                nullable: *nullable,
            },
            PropertyKind::Reference { target } => TypeRef::entity(target),
            PropertyKind::Collection { target } | PropertyKind::ManyToMany { target, .. } => {
                TypeRef::collection(TypeRef::entity(target))
            }
        }
    }

    pub fn is_simple(&self) -> bool {
        matches!(self.kind, PropertyKind::Scalar { .. })
    }

    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Scalar { .. } => None,
            PropertyKind::Reference { target }
            | PropertyKind::Collection { target }
            | PropertyKind::ManyToMany { target, .. } => Some(target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMapping {
    pub name: String,
    pub table: String,
    pub id_property: Option<String>,
    /// Declaration order is preserved and drives column order everywhere.
    pub properties: Vec<PropertyMapping>,
}

impl EntityMapping {
    pub fn property(&self, name: &str) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn id(&self) -> Option<&PropertyMapping> {
        self.id_property.as_deref().and_then(|id| self.property(id))
    }

    pub fn property_ref(&self, property: &PropertyMapping) -> PropertyRef {
        PropertyRef::new(&self.name, &property.name, property.ty())
    }
}

/// Fluent builder for [`EntityMapping`].
///
/// ```
/// use model::{core::data_type::DataType, mapping::entity::EntityBuilder};
///
/// let order = EntityBuilder::new("Order")
///     .id("Id", DataType::Int)
///     .property("Reference", DataType::VarChar).max_length(20).add()
///     .reference("Customer", "Customer").add()
///     .build();
/// assert_eq!(order.table, "ORDER");
/// ```
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    entity: EntityMapping,
}

impl EntityBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            entity: EntityMapping {
                name: name.to_string(),
                table: naming::table_name(name),
                id_property: None,
                properties: Vec::new(),
            },
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.entity.table = table.to_string();
        self
    }

    /// Declares the primary-key property.
    pub fn id(mut self, name: &str, data_type: DataType) -> Self {
        self.entity.id_property = Some(name.to_string());
        self.property(name, data_type).add()
    }

    pub fn property(self, name: &str, data_type: DataType) -> PropertyBuilder {
        let column = naming::column_name(name);
        PropertyBuilder::new(
            self,
            name,
            column,
            PropertyKind::Scalar {
                data_type,
                nullable: false,
                max_length: None,
            },
        )
    }

    pub fn reference(self, name: &str, target: &str) -> PropertyBuilder {
        let column = naming::foreign_key_column(name);
        PropertyBuilder::new(
            self,
            name,
            column,
            PropertyKind::Reference {
                target: target.to_string(),
            },
        )
    }

    pub fn collection(self, name: &str, target: &str) -> PropertyBuilder {
        let column = naming::foreign_key_column(name);
        PropertyBuilder::new(
            self,
            name,
            column,
            PropertyKind::Collection {
                target: target.to_string(),
            },
        )
    }

    pub fn many_to_many(self, name: &str, target: &str) -> PropertyBuilder {
        let link_table = naming::link_table_name(&self.entity.table, name);
        let owner_column = naming::foreign_key_column(&self.entity.name);
        let target_column = naming::foreign_key_column(target);
        PropertyBuilder::new(
            self,
            name,
            String::new(),
            PropertyKind::ManyToMany {
                target: target.to_string(),
                link_table,
                owner_column,
                target_column,
            },
        )
    }

    pub fn build(self) -> EntityMapping {
        self.entity
    }
}

pub struct PropertyBuilder {
    entity_builder: EntityBuilder,
    property: PropertyMapping,
}

impl PropertyBuilder {
    fn new(entity_builder: EntityBuilder, name: &str, column: String, kind: PropertyKind) -> Self {
        Self {
            entity_builder,
            property: PropertyMapping {
                name: name.to_string(),
                column,
                kind,
            },
        }
    }

    pub fn column(mut self, column: &str) -> Self {
        self.property.column = column.to_string();
        self
    }

    pub fn nullable(mut self) -> Self {
        if let PropertyKind::Scalar { nullable, .. } = &mut self.property.kind {
            *nullable = true;
        }
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        if let PropertyKind::Scalar { max_length, .. } = &mut self.property.kind {
            *max_length = Some(length);
        }
        self
    }

    /// Overrides the link table of a many-to-many property.
    pub fn link_table(mut self, table: &str) -> Self {
        if let PropertyKind::ManyToMany { link_table, .. } = &mut self.property.kind {
            *link_table = table.to_string();
        }
        self
    }

    pub fn add(mut self) -> EntityBuilder {
        self.entity_builder.entity.properties.push(self.property);
        self.entity_builder
    }
}
