use crate::query::{
    ast::common::JoinKind,
    dml::{
        AliasDefinition, AliasId, AliasOrigin, BinaryOp, DmlTree, Join, Node, NodeId, RequestId,
    },
    mapping::{Fragment, PropertyMapper, Resolved, SqlMapping},
};
use model::{
    core::types::PropertyRef,
    error::MappingError,
    mapping::{
        MappingCatalog,
        entity::{PropertyKind, PropertyMapping},
    },
};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{debug, trace};

/// [`SqlMapping`] backed by a [`MappingCatalog`].
///
/// Registered equivalents are shared by every statement compiled against
/// this mapping; the last registration for a member wins.
pub struct DefaultSqlMapping {
    catalog: Arc<MappingCatalog>,
    equivalents: RwLock<HashMap<PropertyRef, Fragment>>,
    mappers: Vec<Arc<dyn PropertyMapper>>,
}

impl DefaultSqlMapping {
    pub fn new(catalog: Arc<MappingCatalog>) -> Self {
        Self {
            catalog,
            equivalents: RwLock::new(HashMap::new()),
            mappers: Vec::new(),
        }
    }

    pub fn with_mapper(mut self, mapper: Arc<dyn PropertyMapper>) -> Self {
        self.mappers.push(mapper);
        self
    }

    pub fn catalog(&self) -> &Arc<MappingCatalog> {
        &self.catalog
    }

    pub fn registered_equivalent(&self, property: &PropertyRef) -> Option<Fragment> {
        self.equivalents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(property)
            .cloned()
    }

    fn id_column(&self, entity: &str) -> Result<String, MappingError> {
        let id = self.catalog.id_property(entity)?;
        self.catalog.column_name(&id)
    }

    fn table_alias(
        &self,
        tree: &mut DmlTree,
        entity: &str,
        origin: AliasOrigin,
    ) -> Result<AliasId, MappingError> {
        let table = self.catalog.table_name(entity)?;
        let id_column = self.id_column(entity)?;
        Ok(tree.add_alias(AliasDefinition::table(&table, entity, Some(id_column)).with_origin(origin)))
    }

    /// `left_alias.left_column = right_alias.right_column`
    fn equality(
        tree: &mut DmlTree,
        left_alias: AliasId,
        left_column: &str,
        right_alias: AliasId,
        right_column: &str,
    ) -> NodeId {
        let left = tree.add(Node::column(left_alias, left_column));
        let right = tree.add(Node::column(right_alias, right_column));
        tree.add(Node::Binary {
            op: BinaryOp::Equal,
            left,
            right,
        })
    }

    fn join_kind(widen: bool) -> JoinKind {
        if widen { JoinKind::Left } else { JoinKind::Inner }
    }

    /// Reuses the join for `owner.property` if `request` already has one.
    fn existing_navigation(
        tree: &mut DmlTree,
        request: RequestId,
        owner: AliasId,
        property: &PropertyRef,
        widen: bool,
    ) -> Option<AliasId> {
        let alias = tree
            .request(request)
            .joins
            .iter()
            .map(|join| join.alias)
            .find(|alias| tree.alias(*alias).is_navigation_of(owner, property))?;

        if widen {
            let via = tree.alias(alias).via();
            for join in tree.request_mut(request).joins.iter_mut() {
                if join.alias == alias || Some(join.alias) == via {
                    join.kind = JoinKind::Left;
                }
            }
        }
        trace!("Reusing join for {property}");
        Some(alias)
    }

    fn join_reference(
        &self,
        tree: &mut DmlTree,
        request: RequestId,
        owner: AliasId,
        property: &PropertyRef,
        mapping: &PropertyMapping,
        target: &str,
        widen: bool,
    ) -> Result<AliasId, MappingError> {
        if let Some(alias) = Self::existing_navigation(tree, request, owner, property, widen) {
            return Ok(alias);
        }

        let origin = AliasOrigin::Navigation {
            owner,
            property: property.clone(),
            via: None,
        };
        let alias = self.table_alias(tree, target, origin)?;
        let target_id = self.id_column(target)?;
        let on = Self::equality(tree, owner, &mapping.column, alias, &target_id);
        tree.push_join(
            request,
            Join {
                alias,
                kind: Self::join_kind(widen),
                on,
            },
        );
        debug!("Joined {property} as {}", tree.alias(alias).name);
        Ok(alias)
    }

    /// One-to-many joins are never shared: collection operators move them
    /// into their own sub-request.
    fn join_collection(
        &self,
        tree: &mut DmlTree,
        request: RequestId,
        owner: AliasId,
        property: &PropertyRef,
        mapping: &PropertyMapping,
        target: &str,
        widen: bool,
    ) -> Result<AliasId, MappingError> {
        let origin = AliasOrigin::Navigation {
            owner,
            property: property.clone(),
            via: None,
        };
        let alias = self.table_alias(tree, target, origin)?;
        let owner_id = self.id_column(&property.owner)?;
        let on = Self::equality(tree, alias, &mapping.column, owner, &owner_id);
        tree.push_join(
            request,
            Join {
                alias,
                kind: Self::join_kind(widen),
                on,
            },
        );
        debug!("Joined collection {property} as {}", tree.alias(alias).name);
        Ok(alias)
    }

    #[allow(clippy::too_many_arguments)]
    fn join_many_to_many(
        &self,
        tree: &mut DmlTree,
        request: RequestId,
        owner: AliasId,
        property: &PropertyRef,
        target: &str,
        link_table: &str,
        owner_column: &str,
        target_column: &str,
        widen: bool,
    ) -> Result<AliasId, MappingError> {
        let owner_id = self.id_column(&property.owner)?;
        let target_id = self.id_column(target)?;

        let mut link_definition = AliasDefinition::table(link_table, link_table, None);
        link_definition.entity = None;
        let link = tree.add_alias(link_definition.with_origin(AliasOrigin::Link {
            owner,
            property: property.clone(),
        }));
        let on = Self::equality(tree, link, owner_column, owner, &owner_id);
        tree.push_join(
            request,
            Join {
                alias: link,
                kind: Self::join_kind(widen),
                on,
            },
        );

        let origin = AliasOrigin::Navigation {
            owner,
            property: property.clone(),
            via: Some(link),
        };
        let alias = self.table_alias(tree, target, origin)?;
        let on = Self::equality(tree, alias, &target_id, link, target_column);
        tree.push_join(
            request,
            Join {
                alias,
                kind: Self::join_kind(widen),
                on,
            },
        );
        debug!(
            "Joined {property} through {link_table} as {}",
            tree.alias(alias).name
        );
        Ok(alias)
    }
}

impl SqlMapping for DefaultSqlMapping {
    fn sql_equivalent_for_type(&self, entity: &str) -> Result<String, MappingError> {
        self.catalog.table_name(entity)
    }

    fn sql_equivalent_for_property(
        &self,
        tree: &mut DmlTree,
        request: RequestId,
        owner: AliasId,
        property: &PropertyRef,
        widen: bool,
    ) -> Result<Resolved, MappingError> {
        if let Some(fragment) = self.registered_equivalent(property) {
            trace!("Using registered equivalent of {property}");
            return fragment
                .instantiate(tree, self, request, owner, widen)
                .map(Resolved::Node);
        }

        let mapping = self.catalog.property_mapping(property)?;
        match &mapping.kind {
            PropertyKind::Scalar { .. } => {
                Ok(Resolved::Node(tree.add(Node::column(owner, &mapping.column))))
            }
            PropertyKind::Reference { target } => self
                .join_reference(tree, request, owner, property, &mapping, target, widen)
                .map(Resolved::Alias),
            PropertyKind::Collection { target } => self
                .join_collection(tree, request, owner, property, &mapping, target, widen)
                .map(Resolved::Alias),
            PropertyKind::ManyToMany {
                target,
                link_table,
                owner_column,
                target_column,
            } => self
                .join_many_to_many(
                    tree,
                    request,
                    owner,
                    property,
                    target,
                    link_table,
                    owner_column,
                    target_column,
                    widen,
                )
                .map(Resolved::Alias),
        }
    }

    fn register_sql_equivalent(&self, tree: &DmlTree, property: &PropertyRef, node: NodeId) {
        let Some(anchor) = tree
            .owning_request(node)
            .and_then(|request| tree.request(request).from)
        else {
            debug!("Equivalent of {property} is detached, not registering");
            return;
        };
        let Some(fragment) = Fragment::capture(tree, node, anchor) else {
            debug!("Equivalent of {property} is not reusable, not registering");
            return;
        };

        trace!("Registering equivalent of {property}");
        self.equivalents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(property.clone(), fragment);
    }

    fn column_name(&self, property: &PropertyRef) -> Result<String, MappingError> {
        self.catalog.column_name(property)
    }

    fn id_property(&self, entity: &str) -> Result<PropertyRef, MappingError> {
        self.catalog.id_property(entity)
    }

    fn property_mapping(&self, property: &PropertyRef) -> Result<PropertyMapping, MappingError> {
        self.catalog.property_mapping(property)
    }

    fn mapped_simple_properties(&self, entity: &str) -> Result<Vec<PropertyRef>, MappingError> {
        self.catalog.mapped_simple_properties(entity)
    }

    fn mapped_properties(&self, entity: &str) -> Result<Vec<PropertyRef>, MappingError> {
        self.catalog.mapped_properties(entity)
    }

    fn entity_names(&self) -> Vec<String> {
        self.catalog
            .entities()
            .iter()
            .map(|entity| entity.name.clone())
            .collect()
    }

    fn custom_property_mappers(&self) -> &[Arc<dyn PropertyMapper>] {
        &self.mappers
    }
}
