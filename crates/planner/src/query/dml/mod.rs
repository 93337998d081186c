//! The relational intermediate form produced by translation.
//!
//! Nodes, aliases and requests live in a single [`DmlTree`] arena and refer
//! to each other by index handles. Parent links are maintained by the tree
//! itself: every mutator that attaches a node to a request or to another
//! node records the owner, so [`DmlTree::owning_request`] can walk upwards
//! without any back-pointers in the node payloads.

use model::core::types::PropertyRef;
use query_syntax::ParamId;
use std::fmt;

pub mod alias;
pub mod node;
pub mod request;
pub mod rewrite;

pub use alias::{AliasDefinition, AliasOrigin, AliasSource};
pub use node::{ALL_COLUMNS, BinaryOp, Node, UnaryOp};
pub use request::{Join, OrderElement, Request, RequestKind, SelectInfo, UpdateOrInsertInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AliasId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(usize);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// What a node is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Node(NodeId),
    Request(RequestId),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    node: Node,
    parent: Option<Owner>,
}

#[derive(Debug, Clone, Default)]
pub struct DmlTree {
    nodes: Vec<NodeEntry>,
    aliases: Vec<AliasDefinition>,
    requests: Vec<Request>,
}

impl DmlTree {
    pub fn new() -> Self {
        Self::default()
    }

    // Nodes

    /// Adds a node and adopts its children.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        for child in node.children() {
            self.nodes[child.0].parent = Some(Owner::Node(id));
        }
        self.nodes.push(NodeEntry { node, parent: None });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0].node
    }

    pub fn parent(&self, id: NodeId) -> Option<Owner> {
        self.nodes[id.0].parent
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The request a node ultimately belongs to, if it is attached.
    pub fn owning_request(&self, id: NodeId) -> Option<RequestId> {
        let mut cursor = id;
        loop {
            match self.parent(cursor)? {
                Owner::Node(parent) => cursor = parent,
                Owner::Request(request) => return Some(request),
            }
        }
    }

    fn attach(&mut self, node: NodeId, request: RequestId) {
        self.nodes[node.0].parent = Some(Owner::Request(request));
    }

    // Aliases

    /// Registers an alias; names are handed out in creation order.
    pub fn add_alias(&mut self, mut definition: AliasDefinition) -> AliasId {
        let id = AliasId(self.aliases.len());
        definition.name = format!("t{}", id.0);
        self.aliases.push(definition);
        id
    }

    pub fn alias(&self, id: AliasId) -> &AliasDefinition {
        &self.aliases[id.0]
    }

    pub fn alias_mut(&mut self, id: AliasId) -> &mut AliasDefinition {
        &mut self.aliases[id.0]
    }

    /// Makes `param` resolve to `alias` from now on.
    pub fn bind_param(&mut self, alias: AliasId, param: ParamId) {
        let params = &mut self.aliases[alias.0].params;
        if !params.contains(&param) {
            params.push(param);
        }
    }

    /// Looks up the alias a lambda parameter is bound to, starting at
    /// `request` and moving outwards through its parents.
    pub fn alias_for(&self, request: RequestId, param: ParamId) -> Option<AliasId> {
        let mut cursor = Some(request);
        while let Some(current) = cursor {
            let found = self
                .aliases_of(current)
                .find(|alias| self.alias(*alias).params.contains(&param));
            if found.is_some() {
                return found;
            }
            cursor = self.request(current).parent;
        }
        None
    }

    /// The FROM alias followed by every joined alias of a request.
    pub fn aliases_of(&self, request: RequestId) -> impl Iterator<Item = AliasId> + '_ {
        let request = self.request(request);
        request
            .from
            .into_iter()
            .chain(request.joins.iter().map(|join| join.alias))
    }

    // Requests

    pub fn add_request(&mut self, parent: Option<RequestId>) -> RequestId {
        let id = RequestId(self.requests.len());
        self.requests.push(Request::new(parent));
        id
    }

    pub fn request(&self, id: RequestId) -> &Request {
        &self.requests[id.0]
    }

    pub fn request_mut(&mut self, id: RequestId) -> &mut Request {
        &mut self.requests[id.0]
    }

    /// The outermost ancestor of a request.
    pub fn top_parent(&self, id: RequestId) -> RequestId {
        let mut cursor = id;
        while let Some(parent) = self.request(cursor).parent {
            cursor = parent;
        }
        cursor
    }

    pub fn push_select(&mut self, request: RequestId, info: SelectInfo) {
        self.attach(info.node, request);
        self.request_mut(request).select.push(info);
    }

    pub fn clear_select(&mut self, request: RequestId) {
        self.request_mut(request).select.clear();
    }

    /// Conjoins `node` into the WHERE clause.
    pub fn and_where(&mut self, request: RequestId, node: NodeId) {
        let combined = match self.request(request).where_clause {
            Some(existing) => self.add(Node::Binary {
                op: BinaryOp::And,
                left: existing,
                right: node,
            }),
            None => node,
        };
        self.attach(combined, request);
        self.request_mut(request).where_clause = Some(combined);
    }

    /// Conjoins `node` into the HAVING clause.
    pub fn and_having(&mut self, request: RequestId, node: NodeId) {
        let combined = match self.request(request).having {
            Some(existing) => self.add(Node::Binary {
                op: BinaryOp::And,
                left: existing,
                right: node,
            }),
            None => node,
        };
        self.attach(combined, request);
        self.request_mut(request).having = Some(combined);
    }

    pub fn push_group_by(
        &mut self,
        request: RequestId,
        node: NodeId,
        member: Option<PropertyRef>,
    ) {
        self.attach(node, request);
        let request = self.request_mut(request);
        request.group_by.push(node);
        request.group_members.push(member);
    }

    pub fn push_order(&mut self, request: RequestId, node: NodeId, ascending: bool) {
        self.attach(node, request);
        self.request_mut(request)
            .orders
            .push(OrderElement { node, ascending });
    }

    pub fn push_join(&mut self, request: RequestId, join: Join) {
        self.attach(join.on, request);
        self.request_mut(request).joins.push(join);
    }

    /// Detaches the join introducing `alias` from `request`.
    pub fn take_join(&mut self, request: RequestId, alias: AliasId) -> Option<Join> {
        let joins = &mut self.request_mut(request).joins;
        let position = joins.iter().position(|join| join.alias == alias)?;
        Some(joins.remove(position))
    }

    pub fn push_assignment(&mut self, request: RequestId, info: UpdateOrInsertInfo) {
        self.attach(info.column, request);
        self.attach(info.value, request);
        self.request_mut(request).assignments.push(info);
    }
}
