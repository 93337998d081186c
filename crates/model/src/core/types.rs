//! Static types of the typed query: scalars, mapped entities, collections,
//! query sources, groupings and projection shapes.

use crate::core::data_type::DataType;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Scalar { data_type: DataType, nullable: bool },
    /// A mapped entity, by name.
    Entity(String),
    /// A navigation collection (`x.Children`).
    Collection(Box<TypeRef>),
    /// A query source; the root of every operator chain.
    Query(Box<TypeRef>),
    Grouping {
        key: Box<TypeRef>,
        element: Box<TypeRef>,
    },
    /// An unmapped projection shape: anonymous objects and DTOs.
    Object(String),
}

impl TypeRef {
    pub fn scalar(data_type: DataType) -> Self {
        TypeRef::Scalar {
            data_type,
            nullable: false,
        }
    }

    pub fn nullable(data_type: DataType) -> Self {
        TypeRef::Scalar {
            data_type,
            nullable: true,
        }
    }

    pub fn boolean() -> Self {
        Self::scalar(DataType::Boolean)
    }

    pub fn entity(name: impl Into<String>) -> Self {
        TypeRef::Entity(name.into())
    }

    pub fn object(name: impl Into<String>) -> Self {
        TypeRef::Object(name.into())
    }

    pub fn collection(element: TypeRef) -> Self {
        TypeRef::Collection(Box::new(element))
    }

    pub fn query(element: TypeRef) -> Self {
        TypeRef::Query(Box::new(element))
    }

    pub fn grouping(key: TypeRef, element: TypeRef) -> Self {
        TypeRef::Grouping {
            key: Box::new(key),
            element: Box::new(element),
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, TypeRef::Query(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, TypeRef::Collection(_))
    }

    pub fn is_grouping(&self) -> bool {
        matches!(self, TypeRef::Grouping { .. })
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, TypeRef::Scalar { data_type, .. } if data_type.is_textual())
    }

    /// The element type produced when iterating this type.
    pub fn element(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Query(inner) | TypeRef::Collection(inner) => Some(inner),
            TypeRef::Grouping { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn entity_name(&self) -> Option<&str> {
        match self {
            TypeRef::Entity(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar {
                data_type,
                nullable,
            } => {
                write!(f, "{data_type}")?;
                if *nullable {
                    write!(f, "?")?;
                }
                Ok(())
            }
            TypeRef::Entity(name) | TypeRef::Object(name) => write!(f, "{name}"),
            TypeRef::Collection(inner) => write!(f, "Collection<{inner}>"),
            TypeRef::Query(inner) => write!(f, "Query<{inner}>"),
            TypeRef::Grouping { key, element } => write!(f, "Grouping<{key}, {element}>"),
        }
    }
}

/// A property of a mapped entity or of a projection shape.
///
/// Identity is the pair (owner, name); the type travels along so that
/// projection shapes unknown to the catalog can still be reasoned about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRef {
    pub owner: String,
    pub name: String,
    pub ty: TypeRef,
}

impl PropertyRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            ty,
        }
    }
}

impl PartialEq for PropertyRef {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name
    }
}

impl Eq for PropertyRef {}

impl Hash for PropertyRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}
