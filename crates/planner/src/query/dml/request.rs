use crate::query::{
    ast::common::JoinKind,
    dml::{AliasId, NodeId, RequestId},
};
use model::core::types::{PropertyRef, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestKind {
    #[default]
    Select,
    Update,
    Delete,
    InsertSelect,
}

/// One projected value of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectInfo {
    pub node: NodeId,
    /// The destination member this value populates, if any.
    pub property: Option<PropertyRef>,
    /// Marks the first column of a new materialized object.
    pub new_element: bool,
    /// Output column name; set when the request is used as a derived table.
    pub label: Option<String>,
}

impl SelectInfo {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            property: None,
            new_element: true,
            label: None,
        }
    }

    pub fn member(node: NodeId, property: Option<PropertyRef>, new_element: bool) -> Self {
        Self {
            node,
            property,
            new_element,
            label: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderElement {
    pub node: NodeId,
    pub ascending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Join {
    pub alias: AliasId,
    pub kind: JoinKind,
    pub on: NodeId,
}

/// A `column = value` pair of an UPDATE or INSERT … SELECT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateOrInsertInfo {
    /// Always a [`Node::Column`](super::Node::Column) on the target alias.
    pub column: NodeId,
    pub value: NodeId,
}

/// One SELECT/UPDATE/DELETE/INSERT-SELECT unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub kind: RequestKind,
    pub from: Option<AliasId>,
    /// Table written by UPDATE/DELETE/INSERT; the FROM alias when unset.
    pub target: Option<AliasId>,
    pub joins: Vec<Join>,
    pub select: Vec<SelectInfo>,
    pub where_clause: Option<NodeId>,
    pub having: Option<NodeId>,
    pub group_by: Vec<NodeId>,
    /// Key member of each GROUP BY entry; `None` for a single-valued key.
    pub group_members: Vec<Option<PropertyRef>>,
    pub orders: Vec<OrderElement>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    pub distinct: bool,
    pub assignments: Vec<UpdateOrInsertInfo>,
    pub parent: Option<RequestId>,
    /// Element type the rows of this request materialize into.
    pub projection: Option<TypeRef>,
    pub id_column: Option<String>,
}

impl Request {
    pub fn new(parent: Option<RequestId>) -> Self {
        Self {
            kind: RequestKind::Select,
            from: None,
            target: None,
            joins: Vec::new(),
            select: Vec::new(),
            where_clause: None,
            having: None,
            group_by: Vec::new(),
            group_members: Vec::new(),
            orders: Vec::new(),
            skip: None,
            take: None,
            distinct: false,
            assignments: Vec::new(),
            parent,
            projection: None,
            id_column: None,
        }
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn is_paged(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }

    pub fn join_for(&self, alias: AliasId) -> Option<&Join> {
        self.joins.iter().find(|join| join.alias == alias)
    }
}
