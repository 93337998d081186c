//! The long-lived mapping metadata: which table a type lives in, which
//! column backs each property, which property is the primary key and where
//! navigation properties lead.
//!
//! The catalog is populated at startup and read concurrently afterwards.
//! Registration takes a write lock, lookups take a read lock.

use crate::{
    core::types::PropertyRef,
    error::MappingError,
    mapping::entity::{EntityMapping, PropertyKind, PropertyMapping},
};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};
use tracing::debug;

pub mod entity;
pub mod naming;

#[derive(Debug, Default)]
struct CatalogState {
    entities: HashMap<String, Arc<EntityMapping>>,
    order: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MappingCatalog {
    state: RwLock<CatalogState>,
}

impl MappingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a fixed set of entities.
    pub fn with_entities<I>(entities: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = EntityMapping>,
    {
        let catalog = Self::new();
        for entity in entities {
            catalog.register(entity)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn register(&self, entity: EntityMapping) -> Result<(), MappingError> {
        if let Some(id) = &entity.id_property
            && entity.property(id).is_none()
        {
            return Err(MappingError::UnknownProperty(format!("{}.{id}", entity.name)));
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.entities.contains_key(&entity.name) {
            return Err(MappingError::DuplicateEntity(entity.name));
        }

        debug!("Registering mapping for '{}' -> {}", entity.name, entity.table);
        state.order.push(entity.name.clone());
        state.entities.insert(entity.name.clone(), Arc::new(entity));
        Ok(())
    }

    /// Checks that every navigation property targets a mapped type with a
    /// primary key.
    pub fn validate(&self) -> Result<(), MappingError> {
        let state = self.read();
        for name in &state.order {
            let Some(entity) = state.entities.get(name) else {
                continue;
            };
            for property in &entity.properties {
                let Some(target) = property.target() else {
                    continue;
                };
                let target_entity = state.entities.get(target).ok_or_else(|| {
                    MappingError::InvalidRelation {
                        property: format!("{}.{}", entity.name, property.name),
                        reason: format!("target type '{target}' is not mapped"),
                    }
                })?;
                if target_entity.id().is_none() {
                    return Err(MappingError::MissingIdProperty(target.to_string()));
                }
                if !matches!(property.kind, PropertyKind::Reference { .. }) && entity.id().is_none()
                {
                    return Err(MappingError::MissingIdProperty(entity.name.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Result<Arc<EntityMapping>, MappingError> {
        self.read()
            .entities
            .get(name)
            .cloned()
            .ok_or_else(|| MappingError::UnknownEntity(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().entities.contains_key(name)
    }

    /// All entities, in registration order.
    pub fn entities(&self) -> Vec<Arc<EntityMapping>> {
        let state = self.read();
        state
            .order
            .iter()
            .filter_map(|name| state.entities.get(name).cloned())
            .collect()
    }

    /// Looks up a property reference, typically to build typed queries.
    pub fn property(&self, owner: &str, name: &str) -> Result<PropertyRef, MappingError> {
        let entity = self.entity(owner)?;
        let mapping = entity
            .property(name)
            .ok_or_else(|| MappingError::UnknownProperty(format!("{owner}.{name}")))?;
        Ok(entity.property_ref(mapping))
    }

    pub fn property_mapping(&self, property: &PropertyRef) -> Result<PropertyMapping, MappingError> {
        let entity = self.entity(&property.owner)?;
        entity
            .property(&property.name)
            .cloned()
            .ok_or_else(|| MappingError::UnknownProperty(property.to_string()))
    }

    pub fn table_name(&self, entity: &str) -> Result<String, MappingError> {
        Ok(self.entity(entity)?.table.clone())
    }

    pub fn column_name(&self, property: &PropertyRef) -> Result<String, MappingError> {
        Ok(self.property_mapping(property)?.column)
    }

    pub fn id_property(&self, entity: &str) -> Result<PropertyRef, MappingError> {
        let mapping = self.entity(entity)?;
        let id = mapping
            .id()
            .ok_or_else(|| MappingError::MissingIdProperty(entity.to_string()))?;
        Ok(mapping.property_ref(id))
    }

    /// Scalar properties in declaration order.
    pub fn mapped_simple_properties(&self, entity: &str) -> Result<Vec<PropertyRef>, MappingError> {
        let mapping = self.entity(entity)?;
        Ok(mapping
            .properties
            .iter()
            .filter(|p| p.is_simple())
            .map(|p| mapping.property_ref(p))
            .collect())
    }

    /// Every mapped property, navigation included, in declaration order.
    pub fn mapped_properties(&self, entity: &str) -> Result<Vec<PropertyRef>, MappingError> {
        let mapping = self.entity(entity)?;
        Ok(mapping
            .properties
            .iter()
            .map(|p| mapping.property_ref(p))
            .collect())
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
