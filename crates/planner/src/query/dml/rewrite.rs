//! Pure structural rewrites over node subtrees.
//!
//! A rewrite never mutates existing nodes: it appends a fresh copy of the
//! subtree in which every node selected by the replacement function is
//! swapped for its replacement. Sub-requests are copied too. Their own
//! sources get fresh aliases, and the replacement is applied to every
//! clause, so a correlated sub-request follows the substitution.

use crate::query::dml::{
    AliasId, AliasOrigin, AliasSource, DmlTree, Join, Node, NodeId, OrderElement, Request,
    RequestId, SelectInfo, UpdateOrInsertInfo,
};
use std::collections::HashMap;

/// Aliases and requests introduced by the copy, keyed by their original.
#[derive(Debug, Clone, Default)]
struct Renames {
    aliases: HashMap<AliasId, AliasId>,
    requests: HashMap<RequestId, RequestId>,
}

impl DmlTree {
    /// Copies the subtree under `root`, substituting every node for which
    /// `replace` returns a replacement. Replacements are not visited again.
    pub fn rewrite<F>(&mut self, root: NodeId, replace: &mut F) -> NodeId
    where
        F: FnMut(&Node) -> Option<Node>,
    {
        self.rewrite_in(root, replace, &Renames::default())
    }

    fn rewrite_in<F>(&mut self, root: NodeId, replace: &mut F, renames: &Renames) -> NodeId
    where
        F: FnMut(&Node) -> Option<Node>,
    {
        let node = self.node(root).clone();
        if let Some(replacement) = replace(&node) {
            return self.add(replacement);
        }

        let rebuilt = match node {
            Node::Column { alias, column } => Node::Column {
                alias: renames.aliases.get(&alias).copied().unwrap_or(alias),
                column,
            },
            Node::AliasRef(alias) => {
                Node::AliasRef(renames.aliases.get(&alias).copied().unwrap_or(alias))
            }
            Node::Unary { op, operand } => Node::Unary {
                op,
                operand: operand.map(|operand| self.rewrite_in(operand, replace, renames)),
            },
            Node::Binary { op, left, right } => {
                let left = self.rewrite_in(left, replace, renames);
                let right = self.rewrite_in(right, replace, renames);
                Node::Binary { op, left, right }
            }
            Node::In { operand, values } => {
                let operand = self.rewrite_in(operand, replace, renames);
                let values = values
                    .into_iter()
                    .map(|value| self.rewrite_in(value, replace, renames))
                    .collect();
                Node::In { operand, values }
            }
            Node::Conditional {
                test,
                then,
                otherwise,
            } => {
                let test = self.rewrite_in(test, replace, renames);
                let then = self.rewrite_in(then, replace, renames);
                let otherwise = self.rewrite_in(otherwise, replace, renames);
                Node::Conditional {
                    test,
                    then,
                    otherwise,
                }
            }
            Node::SubRequest(request) => {
                Node::SubRequest(self.rewrite_request(request, replace, renames))
            }
            leaf @ Node::Constant(_) => leaf,
        };
        self.add(rebuilt)
    }

    /// Copies a whole request. Its FROM and joined aliases are re-registered
    /// so the copy shares no alias with the original.
    fn rewrite_request<F>(&mut self, request: RequestId, replace: &mut F, outer: &Renames) -> RequestId
    where
        F: FnMut(&Node) -> Option<Node>,
    {
        let original = self.request(request).clone();
        let mut renames = outer.clone();
        let parent = original
            .parent
            .map(|parent| renames.requests.get(&parent).copied().unwrap_or(parent));
        let copy = self.add_request(parent);
        renames.requests.insert(request, copy);

        let own: Vec<AliasId> = self.aliases_of(request).collect();
        for alias in own {
            let mut definition = self.alias(alias).clone();
            if let AliasSource::Request(inner) = definition.source {
                definition.source = AliasSource::Request(self.rewrite_request(inner, replace, &renames));
            }
            definition.origin = match definition.origin {
                AliasOrigin::Navigation {
                    owner,
                    property,
                    via,
                } => AliasOrigin::Navigation {
                    owner: rename_alias(owner, replace, &renames),
                    property,
                    via: via.map(|via| rename_alias(via, replace, &renames)),
                },
                AliasOrigin::Link { owner, property } => AliasOrigin::Link {
                    owner: rename_alias(owner, replace, &renames),
                    property,
                },
                AliasOrigin::Root => AliasOrigin::Root,
            };
            let fresh = self.add_alias(definition);
            renames.aliases.insert(alias, fresh);
        }

        {
            let r = self.request_mut(copy);
            r.kind = original.kind;
            r.from = original.from.map(|alias| rename_alias(alias, replace, &renames));
            r.target = original.target.map(|alias| rename_alias(alias, replace, &renames));
            r.skip = original.skip;
            r.take = original.take;
            r.distinct = original.distinct;
            r.projection = original.projection.clone();
            r.id_column = original.id_column.clone();
        }
        for join in &original.joins {
            let on = self.rewrite_in(join.on, replace, &renames);
            let alias = rename_alias(join.alias, replace, &renames);
            self.push_join(copy, Join { alias, kind: join.kind, on });
        }
        for info in &original.select {
            let node = self.rewrite_in(info.node, replace, &renames);
            self.push_select(copy, SelectInfo { node, ..info.clone() });
        }
        if let Some(filter) = original.where_clause {
            let filter = self.rewrite_in(filter, replace, &renames);
            self.and_where(copy, filter);
        }
        if let Some(having) = original.having {
            let having = self.rewrite_in(having, replace, &renames);
            self.and_having(copy, having);
        }
        for (key, member) in original.group_by.iter().zip(&original.group_members) {
            let key = self.rewrite_in(*key, replace, &renames);
            self.push_group_by(copy, key, member.clone());
        }
        for OrderElement { node, ascending } in &original.orders {
            let node = self.rewrite_in(*node, replace, &renames);
            self.push_order(copy, node, *ascending);
        }
        for UpdateOrInsertInfo { column, value } in &original.assignments {
            let column = self.rewrite_in(*column, replace, &renames);
            let value = self.rewrite_in(*value, replace, &renames);
            self.push_assignment(copy, UpdateOrInsertInfo { column, value });
        }
        copy
    }

    /// A detached copy of `root`.
    pub fn duplicate(&mut self, root: NodeId) -> NodeId {
        self.rewrite(root, &mut |_| None)
    }

    /// Copies `root` with every reference to `source` redirected to `target`.
    pub fn clone_with_alias(&mut self, root: NodeId, source: AliasId, target: AliasId) -> NodeId {
        self.rewrite(root, &mut |node| match node {
            Node::Column { alias, column } if *alias == source => Some(Node::Column {
                alias: target,
                column: column.clone(),
            }),
            Node::AliasRef(alias) if *alias == source => Some(Node::AliasRef(target)),
            _ => None,
        })
    }

    /// Whether anything under `root`, sub-requests included, reads `alias`.
    pub fn references_alias(&self, root: NodeId, alias: AliasId) -> bool {
        match self.node(root) {
            Node::Column { alias: a, .. } | Node::AliasRef(a) => *a == alias,
            Node::SubRequest(request) => self.request_references_alias(*request, alias),
            node => node
                .children()
                .into_iter()
                .any(|child| self.references_alias(child, alias)),
        }
    }

    fn request_references_alias(&self, request: RequestId, alias: AliasId) -> bool {
        let r = self.request(request);
        let sources = self.aliases_of(request).chain(r.target).any(|own| {
            own == alias
                || match self.alias(own).source {
                    AliasSource::Request(inner) => self.request_references_alias(inner, alias),
                    AliasSource::Table(_) => false,
                }
        });
        sources
            || clause_nodes(r)
                .into_iter()
                .any(|node| self.references_alias(node, alias))
    }

    /// Compares two subtrees by shape and payload, ignoring node identity.
    /// The sources of two compared sub-requests are matched pairwise, so a
    /// copied sub-request equals its original.
    pub fn structurally_equal(&self, a: NodeId, b: NodeId) -> bool {
        self.equal_under(a, b, &HashMap::new())
    }

    fn equal_under(&self, a: NodeId, b: NodeId, pairs: &HashMap<AliasId, AliasId>) -> bool {
        let same_alias = |x: &AliasId, y: &AliasId| pairs.get(x).unwrap_or(x) == y;
        let (left, right) = (self.node(a), self.node(b));
        let same_payload = match (left, right) {
            (Node::Column { alias: x, column: c }, Node::Column { alias: y, column: d }) => {
                same_alias(x, y) && c == d
            }
            (Node::AliasRef(x), Node::AliasRef(y)) => same_alias(x, y),
            (Node::Constant(_), Node::Constant(_)) => left == right,
            (Node::SubRequest(x), Node::SubRequest(y)) => {
                return self.requests_equal(*x, *y, pairs);
            }
            (Node::Unary { op: x, .. }, Node::Unary { op: y, .. }) => x == y,
            (Node::Binary { op: x, .. }, Node::Binary { op: y, .. }) => x == y,
            (Node::In { .. }, Node::In { .. }) | (Node::Conditional { .. }, Node::Conditional { .. }) => {
                true
            }
            _ => false,
        };
        if !same_payload {
            return false;
        }

        let (left, right) = (left.children(), right.children());
        left.len() == right.len()
            && left
                .into_iter()
                .zip(right)
                .all(|(x, y)| self.equal_under(x, y, pairs))
    }

    fn requests_equal(&self, a: RequestId, b: RequestId, outer: &HashMap<AliasId, AliasId>) -> bool {
        if a == b {
            return true;
        }
        let (x, y) = (self.request(a), self.request(b));
        let mut pairs = outer.clone();
        let (own_x, own_y): (Vec<_>, Vec<_>) = (self.aliases_of(a).collect(), self.aliases_of(b).collect());
        if own_x.len() != own_y.len() {
            return false;
        }
        for (p, q) in own_x.into_iter().zip(own_y) {
            let same_source = match (&self.alias(p).source, &self.alias(q).source) {
                (AliasSource::Table(s), AliasSource::Table(t)) => s == t,
                (AliasSource::Request(s), AliasSource::Request(t)) => self.requests_equal(*s, *t, &pairs),
                _ => false,
            };
            if !same_source {
                return false;
            }
            pairs.insert(p, q);
        }

        let same_target = match (x.target, y.target) {
            (Some(s), Some(t)) => pairs.get(&s).unwrap_or(&s) == &t,
            (None, None) => true,
            _ => false,
        };
        let same_shape = x.kind == y.kind
            && same_target
            && x.skip == y.skip
            && x.take == y.take
            && x.distinct == y.distinct
            && x.joins.len() == y.joins.len()
            && x.joins.iter().zip(&y.joins).all(|(j, k)| j.kind == k.kind)
            && x.select.len() == y.select.len()
            && x.select.iter().zip(&y.select).all(|(s, t)| s.label == t.label && s.property == t.property)
            && x.where_clause.is_some() == y.where_clause.is_some()
            && x.having.is_some() == y.having.is_some()
            && x.group_members == y.group_members
            && x.orders.len() == y.orders.len()
            && x.orders.iter().zip(&y.orders).all(|(o, p)| o.ascending == p.ascending)
            && x.assignments.len() == y.assignments.len();

        same_shape
            && clause_nodes(x)
                .into_iter()
                .zip(clause_nodes(y))
                .all(|(s, t)| self.equal_under(s, t, &pairs))
    }
}

fn rename_alias<F>(alias: AliasId, replace: &mut F, renames: &Renames) -> AliasId
where
    F: FnMut(&Node) -> Option<Node>,
{
    if let Some(fresh) = renames.aliases.get(&alias) {
        return *fresh;
    }
    match replace(&Node::AliasRef(alias)) {
        Some(Node::AliasRef(target)) => target,
        _ => alias,
    }
}

/// Every node hanging off a request's clauses, in clause order.
fn clause_nodes(request: &Request) -> Vec<NodeId> {
    request
        .joins
        .iter()
        .map(|join| join.on)
        .chain(request.select.iter().map(|info| info.node))
        .chain(request.where_clause)
        .chain(request.having)
        .chain(request.group_by.iter().copied())
        .chain(request.orders.iter().map(|order| order.node))
        .chain(request.assignments.iter().flat_map(|info| [info.column, info.value]))
        .collect()
}
