use crate::query::dml::{AliasId, RequestId};
use model::core::types::PropertyRef;
use query_syntax::ParamId;

/// What an alias ranges over.
#[derive(Debug, Clone, PartialEq)]
pub enum AliasSource {
    Table(String),
    /// A derived table.
    Request(RequestId),
}

/// How an alias came to exist.
#[derive(Debug, Clone, PartialEq)]
pub enum AliasOrigin {
    /// The FROM source of a request.
    Root,
    /// Reached by navigating `property` from `owner`. Many-to-many
    /// navigations pass through the `via` link-table alias.
    Navigation {
        owner: AliasId,
        property: PropertyRef,
        via: Option<AliasId>,
    },
    /// The link table of a many-to-many navigation.
    Link { owner: AliasId, property: PropertyRef },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDefinition {
    /// Assigned by the tree on registration (`t0`, `t1`, ...).
    pub name: String,
    pub source: AliasSource,
    pub entity: Option<String>,
    pub id_column: Option<String>,
    /// Lambda parameters that resolve to this alias.
    pub params: Vec<ParamId>,
    pub origin: AliasOrigin,
}

impl AliasDefinition {
    pub fn table(table: &str, entity: &str, id_column: Option<String>) -> Self {
        Self {
            name: String::new(),
            source: AliasSource::Table(table.to_string()),
            entity: Some(entity.to_string()),
            id_column,
            params: Vec::new(),
            origin: AliasOrigin::Root,
        }
    }

    pub fn derived(request: RequestId) -> Self {
        Self {
            name: String::new(),
            source: AliasSource::Request(request),
            entity: None,
            id_column: None,
            params: Vec::new(),
            origin: AliasOrigin::Root,
        }
    }

    pub fn with_origin(mut self, origin: AliasOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// The link-table alias this navigation joins through.
    pub fn via(&self) -> Option<AliasId> {
        match &self.origin {
            AliasOrigin::Navigation { via, .. } => *via,
            _ => None,
        }
    }

    pub fn is_navigation_of(&self, owner: AliasId, property: &PropertyRef) -> bool {
        matches!(
            &self.origin,
            AliasOrigin::Navigation { owner: o, property: p, .. } if *o == owner && p == property
        )
    }
}
