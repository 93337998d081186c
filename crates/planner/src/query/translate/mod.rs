//! Translation of typed queries into the relational form.
//!
//! A [`Translator`] is created per statement and consumed by
//! [`Translator::translate`]. It walks the expression once, keeping an
//! explicit context: the request currently being built and whether the
//! walk is under an `OR` (where navigations must not drop rows). Both are
//! saved and restored around every nested scope.

use crate::query::{
    ast::common::JoinKind,
    dml::{
        AliasDefinition, AliasId, BinaryOp, DmlTree, Join, Node, NodeId, Request, RequestId,
        SelectInfo, UnaryOp,
    },
    mapping::{Resolved, SqlMapping},
};
use model::core::{
    types::{PropertyRef, TypeRef},
    value::Value,
};
use query_syntax::{Expr, Literal, Param, ast::BinaryOp as SyntaxBinaryOp, ast::UnaryOp as SyntaxUnaryOp};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, trace};

pub mod aggregate;
pub mod crud;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod loading;
pub mod materialize;
pub mod projection;

pub use error::TranslateError;
pub use loading::{LoadingHint, LoadingKind, LoadingPlan};

/// Bound on chained member equivalences; deeper chains are cut off.
const MAX_EQUIVALENCE_DEPTH: usize = 32;

/// A translated statement: the relational tree and its root request.
#[derive(Debug, Clone)]
pub struct Statement {
    pub tree: DmlTree,
    pub root: RequestId,
    pub loading: LoadingPlan,
}

impl Statement {
    pub fn request(&self) -> &Request {
        self.tree.request(self.root)
    }

    pub fn projection(&self) -> Option<&TypeRef> {
        self.request().projection.as_ref()
    }
}

/// What visiting an expression produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sql {
    Node(NodeId),
    /// A row of a table: a lambda parameter or a navigation.
    Alias(AliasId),
    Request(RequestId),
}

impl From<Resolved> for Sql {
    fn from(resolved: Resolved) -> Self {
        match resolved {
            Resolved::Node(node) => Sql::Node(node),
            Resolved::Alias(alias) => Sql::Alias(alias),
        }
    }
}

/// Plugs translation of additional expression shapes into the translator.
/// Converters are consulted before the built-in rules.
pub trait ExpressionConverter: Send + Sync {
    fn accepts(&self, expr: &Expr) -> bool;

    fn convert(&self, expr: &Expr, translator: &mut Translator<'_>) -> Result<NodeId, TranslateError>;
}

#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    request: Option<RequestId>,
    in_or: bool,
}

pub struct Translator<'m> {
    mapping: &'m dyn SqlMapping,
    converters: Vec<Arc<dyn ExpressionConverter>>,
    tree: DmlTree,
    scope: Scope,
    /// Projected member -> the mapped path it was read from.
    equivalents: HashMap<PropertyRef, Vec<PropertyRef>>,
    /// Projected member -> the computed value it holds, for members that
    /// are not a plain path.
    projected: HashMap<PropertyRef, NodeId>,
    loading: LoadingPlan,
}

impl<'m> Translator<'m> {
    pub fn new(mapping: &'m dyn SqlMapping) -> Self {
        Self {
            mapping,
            converters: Vec::new(),
            tree: DmlTree::new(),
            scope: Scope::default(),
            equivalents: HashMap::new(),
            projected: HashMap::new(),
            loading: LoadingPlan::default(),
        }
    }

    pub fn with_converter(mut self, converter: Arc<dyn ExpressionConverter>) -> Self {
        self.converters.push(converter);
        self
    }

    pub fn with_converters<I>(mut self, converters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ExpressionConverter>>,
    {
        self.converters.extend(converters);
        self
    }

    /// Translates a query expression into a statement.
    pub fn translate(mut self, expr: &Expr) -> Result<Statement, TranslateError> {
        if !matches!(expr, Expr::Source(_) | Expr::Call { .. }) {
            return Err(TranslateError::invalid(expr, "Expression does not describe a query"));
        }
        debug!("Translating {expr}");

        self.visit(expr)?;
        let active = self.active(expr)?;
        let root = self.tree.top_parent(active);
        materialize::declare_map(&mut self, root)?;

        trace!(
            "Translated into {} nodes, root request {root}",
            self.tree.node_count()
        );
        Ok(Statement {
            tree: self.tree,
            root,
            loading: self.loading,
        })
    }

    pub fn tree(&self) -> &DmlTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DmlTree {
        &mut self.tree
    }

    pub fn mapping(&self) -> &'m dyn SqlMapping {
        self.mapping
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.scope.request
    }

    pub fn in_or(&self) -> bool {
        self.scope.in_or
    }

    /// Visits `expr` as a value. Sub-queries become sub-request nodes and
    /// the active request is left as it was.
    pub fn visit_node(&mut self, expr: &Expr) -> Result<NodeId, TranslateError> {
        let before = self.scope.request;
        let sql = self.visit(expr)?;
        if before.is_some() {
            self.scope.request = before;
        }
        Ok(self.node_of(sql))
    }

    pub(crate) fn node_of(&mut self, sql: Sql) -> NodeId {
        match sql {
            Sql::Node(node) => node,
            Sql::Alias(alias) => self.tree.add(Node::AliasRef(alias)),
            Sql::Request(request) => self.tree.add(Node::SubRequest(request)),
        }
    }

    pub(crate) fn visit(&mut self, expr: &Expr) -> Result<Sql, TranslateError> {
        if let Some(converter) = self.converters.iter().find(|c| c.accepts(expr)).cloned() {
            return converter.convert(expr, self).map(Sql::Node);
        }

        match expr {
            Expr::Source(entity) => self.visit_source(entity).map(Sql::Request),
            Expr::Constant(literal) => self.visit_constant(expr, literal).map(Sql::Node),
            Expr::Parameter(param) => self.visit_parameter(expr, param).map(Sql::Alias),
            Expr::Member { target, property } => self.visit_member(expr, target, property),
            Expr::Key(grouping) => self.visit_key(expr, grouping, None).map(Sql::Node),
            Expr::Binary { op, left, right } => {
                self.visit_binary(expr, *op, left, right).map(Sql::Node)
            }
            Expr::Unary { op, operand } => self.visit_unary(expr, *op, operand),
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => {
                let test = self.visit_node(test)?;
                let test = self.coerce_predicate(test);
                let then = self.visit_node(if_true)?;
                let otherwise = self.visit_node(if_false)?;
                Ok(Sql::Node(self.tree.add(Node::Conditional {
                    test,
                    then,
                    otherwise,
                })))
            }
            Expr::Call { method, args } => dispatch::dispatch(self, expr, method, args),
            Expr::Lambda(_) | Expr::New { .. } | Expr::MemberInit { .. } => Err(
                TranslateError::unsupported(expr, "Expression is only valid as an operator argument"),
            ),
        }
    }

    fn visit_source(&mut self, entity: &str) -> Result<RequestId, TranslateError> {
        let table = self.mapping.sql_equivalent_for_type(entity)?;
        let id_column = match self.mapping.id_property(entity) {
            Ok(id) => Some(self.mapping.column_name(&id)?),
            Err(_) => None,
        };

        let request = self.tree.add_request(self.scope.request);
        let alias = self
            .tree
            .add_alias(AliasDefinition::table(&table, entity, id_column.clone()));
        let r = self.tree.request_mut(request);
        r.from = Some(alias);
        r.projection = Some(TypeRef::entity(entity));
        r.id_column = id_column;

        trace!("Opened {request} over {table}");
        self.scope.request = Some(request);
        Ok(request)
    }

    fn visit_constant(&mut self, expr: &Expr, literal: &Literal) -> Result<NodeId, TranslateError> {
        let value = match literal {
            Literal::Value(value) => value.clone(),
            Literal::Entity { entity, fields } => {
                let id = self.mapping.id_property(entity).map_err(|_| {
                    TranslateError::violation(expr, &format!("The constant for '{entity}' is not supported"))
                })?;
                fields
                    .iter()
                    .find(|(name, _)| *name == id.name)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| TranslateError::violation(expr, "The constant carries no id value"))?
            }
            Literal::List(_) => {
                return Err(TranslateError::unsupported(
                    expr,
                    "Collection constants are only supported as the receiver of Contains",
                ));
            }
        };
        Ok(self.tree.add(Node::Constant(value)))
    }

    fn visit_parameter(&mut self, expr: &Expr, param: &Param) -> Result<AliasId, TranslateError> {
        let request = self.active(expr)?;
        self.tree
            .alias_for(request, param.id)
            .ok_or_else(|| TranslateError::invalid(expr, "Parameter is not bound to any source"))
    }

    fn visit_member(
        &mut self,
        expr: &Expr,
        target: &Expr,
        property: &PropertyRef,
    ) -> Result<Sql, TranslateError> {
        if let Expr::Key(grouping) = target {
            return self.visit_key(expr, grouping, Some(property)).map(Sql::Node);
        }

        match self.visit(target)? {
            Sql::Alias(alias) => self.resolve_member(expr, alias, property),
            Sql::Request(request) => self.member_of_request(expr, request, property).map(Sql::Node),
            Sql::Node(_) => Err(TranslateError::unsupported(
                expr,
                "Member access on a computed value",
            )),
        }
    }

    /// `source.First().Member`: a single-column sub-request.
    fn member_of_request(
        &mut self,
        expr: &Expr,
        request: RequestId,
        property: &PropertyRef,
    ) -> Result<NodeId, TranslateError> {
        let row = self.row_alias(expr, request)?;
        let value = self.with_request(request, |t| t.resolve_member(expr, row, property))?;
        let value = self.node_of(value);
        self.tree.clear_select(request);
        self.tree.push_select(request, SelectInfo::new(value));
        self.tree.request_mut(request).projection = Some(property.ty.clone());

        if let Some(parent) = self.tree.request(request).parent {
            self.scope.request = Some(parent);
        }
        Ok(self.tree.add(Node::SubRequest(request)))
    }

    /// The GROUP BY entries of the grouping `grouping` ranges over, with
    /// the key member each one populates.
    pub(crate) fn grouping_keys(
        &mut self,
        expr: &Expr,
        grouping: &Expr,
    ) -> Result<Vec<(NodeId, Option<PropertyRef>)>, TranslateError> {
        let alias = self.visit_alias(grouping)?;
        let active = self.active(expr)?;
        let owner = self.request_with_from(active, alias).unwrap_or(active);
        let r = self.tree.request(owner);
        if r.group_by.is_empty() {
            return Err(TranslateError::unsupported(expr, "Key used outside a grouping"));
        }
        Ok(r.group_by
            .iter()
            .copied()
            .zip(r.group_members.iter().cloned())
            .collect())
    }

    fn visit_key(
        &mut self,
        expr: &Expr,
        grouping: &Expr,
        member: Option<&PropertyRef>,
    ) -> Result<NodeId, TranslateError> {
        let keys = self.grouping_keys(expr, grouping)?;

        let index = match member {
            None if keys.len() == 1 => 0,
            None => {
                return Err(TranslateError::unsupported(
                    expr,
                    "A composite key can only be projected or used member by member",
                ));
            }
            Some(property) => match keys.iter().position(|(_, m)| m.as_ref() == Some(property)) {
                Some(index) => index,
                None => {
                    // single entity-valued key: navigate from it
                    if let [(single, _)] = keys.as_slice()
                        && let Node::AliasRef(key_alias) = self.tree.node(*single).clone()
                    {
                        let sql = self.resolve_member(expr, key_alias, property)?;
                        return Ok(self.node_of(sql));
                    }
                    return Err(TranslateError::violation(expr, "Not a member of the grouping key"));
                }
            },
        };
        Ok(self.tree.duplicate(keys[index].0))
    }

    fn visit_binary(
        &mut self,
        expr: &Expr,
        op: SyntaxBinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<NodeId, TranslateError> {
        let dml_op = match op {
            SyntaxBinaryOp::And => BinaryOp::And,
            SyntaxBinaryOp::Or => BinaryOp::Or,
            SyntaxBinaryOp::Equal => BinaryOp::Equal,
            SyntaxBinaryOp::NotEqual => BinaryOp::NotEqual,
            SyntaxBinaryOp::LessThan => BinaryOp::LessThan,
            SyntaxBinaryOp::LessOrEqual => BinaryOp::LessOrEqual,
            SyntaxBinaryOp::GreaterThan => BinaryOp::GreaterThan,
            SyntaxBinaryOp::GreaterOrEqual => BinaryOp::GreaterOrEqual,
            SyntaxBinaryOp::Coalesce => BinaryOp::Coalesce,
            SyntaxBinaryOp::Add if left.ty().is_textual() || right.ty().is_textual() => {
                BinaryOp::Concat
            }
            SyntaxBinaryOp::Add => BinaryOp::Add,
            SyntaxBinaryOp::Subtract => BinaryOp::Subtract,
            SyntaxBinaryOp::Multiply => BinaryOp::Multiply,
            SyntaxBinaryOp::Divide => BinaryOp::Divide,
            SyntaxBinaryOp::Modulo | SyntaxBinaryOp::ExclusiveOr => {
                return Err(TranslateError::unsupported(
                    expr,
                    &format!("The operator '{op}' is not supported"),
                ));
            }
        };

        let in_or = self.scope.in_or || op == SyntaxBinaryOp::Or;
        self.with_in_or(in_or, |t| {
            let mut left = t.visit_node(left)?;
            let mut right = t.visit_node(right)?;
            if op.is_logical() {
                left = t.coerce_predicate(left);
                right = t.coerce_predicate(right);
            }
            Ok(t.tree.add(Node::Binary {
                op: dml_op,
                left,
                right,
            }))
        })
    }

    fn visit_unary(
        &mut self,
        expr: &Expr,
        op: SyntaxUnaryOp,
        operand: &Expr,
    ) -> Result<Sql, TranslateError> {
        match op {
            SyntaxUnaryOp::Not => {
                let operand = self.visit_node(operand)?;
                let operand = self.coerce_predicate(operand);
                Ok(Sql::Node(self.tree.add(Node::Unary {
                    op: UnaryOp::Not,
                    operand: Some(operand),
                })))
            }
            SyntaxUnaryOp::Convert => self.visit(operand),
            SyntaxUnaryOp::Negate => Err(TranslateError::unsupported(
                expr,
                "Arithmetic negation is not supported",
            )),
        }
    }

    /// Turns a bare boolean column into `column = true`.
    pub(crate) fn coerce_predicate(&mut self, node: NodeId) -> NodeId {
        if !matches!(self.tree.node(node), Node::Column { .. }) {
            return node;
        }
        let truth = self.tree.add(Node::Constant(Value::Boolean(true)));
        self.tree.add(Node::Binary {
            op: BinaryOp::Equal,
            left: node,
            right: truth,
        })
    }

    pub(crate) fn visit_alias(&mut self, expr: &Expr) -> Result<AliasId, TranslateError> {
        match self.visit(expr)? {
            Sql::Alias(alias) => Ok(alias),
            _ => Err(TranslateError::unsupported(expr, "Expected a row")),
        }
    }

    /// Resolves `alias.property`, following projected values and
    /// registered member equivalences first.
    pub(crate) fn resolve_member(
        &mut self,
        expr: &Expr,
        alias: AliasId,
        property: &PropertyRef,
    ) -> Result<Sql, TranslateError> {
        let request = self.active(expr)?;
        let path = self.real_path(property);
        if let Some(value) = path.first().and_then(|head| self.projected.get(head)).copied() {
            if path.len() > 1 {
                return Err(TranslateError::violation(
                    expr,
                    &format!("'{}' is not reachable from a value", path[1]),
                ));
            }
            trace!("{property} reuses its projected value");
            return Ok(Sql::Node(self.tree.duplicate(value)));
        }

        let mut current = Sql::Alias(alias);
        for step in path {
            let Sql::Alias(owner) = current else {
                return Err(TranslateError::violation(
                    expr,
                    &format!("'{step}' is not reachable from a value"),
                ));
            };
            let in_or = self.scope.in_or;
            current = self
                .mapping
                .sql_equivalent_for_property(&mut self.tree, request, owner, &step, in_or)?
                .into();
        }
        Ok(current)
    }

    /// The mapped path a (possibly projected) member reads from.
    fn real_path(&self, property: &PropertyRef) -> Vec<PropertyRef> {
        let mut path = vec![property.clone()];
        for _ in 0..MAX_EQUIVALENCE_DEPTH {
            let Some(source) = path.first().and_then(|head| self.equivalents.get(head)) else {
                break;
            };
            let mut expanded = source.clone();
            expanded.extend(path.drain(1..));
            path = expanded;
        }
        path
    }

    pub(crate) fn add_equivalent(&mut self, member: &PropertyRef, path: Vec<PropertyRef>) {
        if path.len() == 1 && path[0] == *member {
            return;
        }
        trace!("{member} is read from {}", join_path(&path));
        self.projected.remove(member);
        self.equivalents.insert(member.clone(), path);
    }

    pub(crate) fn add_projected(&mut self, member: &PropertyRef, value: NodeId) {
        self.equivalents.remove(member);
        self.projected.insert(member.clone(), value);
    }

    pub(crate) fn with_in_or<T>(
        &mut self,
        in_or: bool,
        f: impl FnOnce(&mut Self) -> Result<T, TranslateError>,
    ) -> Result<T, TranslateError> {
        let saved = self.scope.in_or;
        self.scope.in_or = in_or;
        let result = f(self);
        self.scope.in_or = saved;
        result
    }

    pub(crate) fn with_request<T>(
        &mut self,
        request: RequestId,
        f: impl FnOnce(&mut Self) -> Result<T, TranslateError>,
    ) -> Result<T, TranslateError> {
        let saved = self.scope.request;
        self.scope.request = Some(request);
        let result = f(self);
        self.scope.request = saved;
        result
    }

    pub(crate) fn active(&self, expr: &Expr) -> Result<RequestId, TranslateError> {
        self.scope
            .request
            .ok_or_else(|| TranslateError::invalid(expr, "No query source in scope"))
    }

    pub(crate) fn set_active(&mut self, request: RequestId) {
        self.scope.request = Some(request);
    }

    /// The request of `request`'s ancestry whose FROM alias is `alias`.
    pub(crate) fn request_with_from(&self, request: RequestId, alias: AliasId) -> Option<RequestId> {
        let mut cursor = Some(request);
        while let Some(current) = cursor {
            if self.tree.request(current).from == Some(alias) {
                return Some(current);
            }
            cursor = self.tree.request(current).parent;
        }
        None
    }

    /// The alias lambda parameters range over: the single projected row
    /// if the request projects one, its FROM alias otherwise.
    pub(crate) fn row_alias(&self, expr: &Expr, request: RequestId) -> Result<AliasId, TranslateError> {
        let r = self.tree.request(request);
        if !r.is_grouped()
            && let [single] = r.select.as_slice()
            && let Node::AliasRef(alias) = self.tree.node(single.node)
        {
            return Ok(*alias);
        }
        r.from
            .ok_or_else(|| TranslateError::unsupported(expr, "Request has no source"))
    }

    /// Binds the parameter of a unary lambda to the row alias of `request`
    /// and returns the lambda body.
    pub(crate) fn bind_lambda<'e>(
        &mut self,
        expr: &Expr,
        request: RequestId,
        lambda: &'e Expr,
    ) -> Result<&'e Expr, TranslateError> {
        let lambda = lambda
            .as_lambda()
            .ok_or_else(|| TranslateError::invalid(expr, "Expected a lambda argument"))?;
        let param = lambda
            .param()
            .ok_or_else(|| TranslateError::invalid(expr, "Expected a single-parameter lambda"))?;
        let alias = self.row_alias(expr, request)?;
        self.tree.bind_param(alias, param.id);
        Ok(&lambda.body)
    }

    /// Visits the receiver of an operator and returns the request it
    /// operates on. Navigations to collections are moved into their own
    /// correlated sub-request first.
    pub(crate) fn receiver_request(
        &mut self,
        expr: &Expr,
        receiver: &Expr,
    ) -> Result<RequestId, TranslateError> {
        match self.visit(receiver)? {
            Sql::Request(request) => Ok(request),
            Sql::Alias(alias) => {
                let active = self.active(expr)?;
                match self.request_with_from(active, alias) {
                    Some(request) => Ok(request),
                    None => self.hoist_join(expr, alias),
                }
            }
            Sql::Node(_) => Err(TranslateError::unsupported(
                expr,
                "Operator applied to a computed value",
            )),
        }
    }

    /// Moves the join chain that introduced `alias` out of the active
    /// request into a new child request correlated with it: the first
    /// alias becomes the child's FROM, the remaining joins follow, and the
    /// join condition to the parent becomes the child's WHERE.
    fn hoist_join(&mut self, expr: &Expr, alias: AliasId) -> Result<RequestId, TranslateError> {
        let parent = self.active(expr)?;
        let mut chain = vec![alias];
        while let Some(via) = chain.last().and_then(|last| self.tree.alias(*last).via()) {
            chain.push(via);
        }

        let mut joins = Vec::with_capacity(chain.len());
        for link in &chain {
            let join = self.tree.take_join(parent, *link).ok_or_else(|| {
                TranslateError::unsupported(expr, "Collection is not navigable from this scope")
            })?;
            joins.push(join);
        }

        let request = self.tree.add_request(Some(parent));
        let definition = self.tree.alias(alias).clone();
        {
            let r = self.tree.request_mut(request);
            r.from = Some(alias);
            r.projection = definition.entity.as_deref().map(TypeRef::entity);
            r.id_column = definition.id_column.clone();
        }
        for pair in joins.windows(2) {
            self.tree.push_join(
                request,
                Join {
                    alias: pair[1].alias,
                    kind: JoinKind::Inner,
                    on: pair[0].on,
                },
            );
        }
        if let Some(last) = joins.last() {
            self.tree.and_where(request, last.on);
        }

        debug!("Moved join {} into child request {request}", definition.name);
        Ok(request)
    }
}

/// The chain of properties `x.A.B` reads, when it starts at a parameter.
pub(crate) fn member_path(expr: &Expr) -> Option<Vec<PropertyRef>> {
    let mut path = Vec::new();
    let mut cursor = expr;
    loop {
        match cursor {
            Expr::Member { target, property } => {
                path.push(property.clone());
                cursor = target;
            }
            Expr::Parameter(_) => break,
            _ => return None,
        }
    }
    path.reverse();
    Some(path)
}

/// Argument `index` of an operator call.
pub(crate) fn arg<'e>(expr: &Expr, args: &'e [Expr], index: usize) -> Result<&'e Expr, TranslateError> {
    args.get(index)
        .ok_or_else(|| TranslateError::invalid(expr, &format!("Missing argument {index}")))
}

fn join_path(path: &[PropertyRef]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Translates `expr` with the built-in rules only.
pub fn translate(expr: &Expr, mapping: &dyn SqlMapping) -> Result<Statement, TranslateError> {
    Translator::new(mapping).translate(expr)
}
