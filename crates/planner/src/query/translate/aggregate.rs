//! Aggregates and `Any`.
//!
//! Over a grouping the aggregate is just a value of the grouped request.
//! Over a correlated sub-request (a navigation collection or a nested
//! query) it replaces the sub-request's select list. At the top level the
//! current request becomes a derived table and the aggregate is computed
//! by a new enclosing request over it.

use crate::query::{
    dml::{AliasDefinition, AliasId, Node, NodeId, RequestId, SelectInfo, UnaryOp},
    translate::{Sql, TranslateError, Translator, filter},
};
use model::core::{types::TypeRef, value::Value};
use query_syntax::{Expr, Method};
use tracing::debug;

/// Label prefix of derived-table columns.
pub const DERIVED_COLUMN_PREFIX: &str = "c";

pub(crate) fn translate_aggregate(
    t: &mut Translator<'_>,
    expr: &Expr,
    method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let op = match method {
        Method::Count => UnaryOp::Count,
        Method::Sum => UnaryOp::Sum,
        Method::Average => UnaryOp::Average,
        Method::Min => UnaryOp::Min,
        Method::Max => UnaryOp::Max,
        other => {
            return Err(TranslateError::unsupported(
                expr,
                &format!("'{other}' is not an aggregate"),
            ));
        }
    };

    let receiver = &args[0];
    if receiver.ty().is_grouping() {
        return aggregate_grouping(t, expr, op, receiver, args.get(1)).map(Sql::Node);
    }

    let request = t.receiver_request(expr, receiver)?;
    let nested = t.tree().request(request).parent.is_some();
    let r = t.tree().request(request);
    let needs_derived = r.is_paged() || r.is_grouped() || r.distinct;

    if nested && !needs_derived {
        aggregate_sub_request(t, expr, op, request, args.get(1)).map(Sql::Node)
    } else if nested {
        let saved = t.active_request();
        let outer = aggregate_derived(t, expr, op, request, args.get(1))?;
        if let Some(saved) = saved {
            t.set_active(saved);
        }
        Ok(Sql::Node(t.tree_mut().add(Node::SubRequest(outer))))
    } else {
        aggregate_derived(t, expr, op, request, args.get(1)).map(Sql::Request)
    }
}

/// `g.Count()`, `g.Count(pred)`, `g.Sum(x => ..)` inside a grouped request.
fn aggregate_grouping(
    t: &mut Translator<'_>,
    expr: &Expr,
    op: UnaryOp,
    receiver: &Expr,
    lambda: Option<&Expr>,
) -> Result<NodeId, TranslateError> {
    let alias = t.visit_alias(receiver)?;
    let active = t.active(expr)?;
    let request = t.request_with_from(active, alias).unwrap_or(active);

    let operand = match (op, lambda) {
        (UnaryOp::Count, None) => None,
        (UnaryOp::Count, Some(predicate)) => {
            let test = t.with_request(request, |t| {
                filter::translate_predicate(t, expr, request, predicate)
            })?;
            let then = t.tree_mut().add(Node::Constant(Value::Int(1)));
            let otherwise = t.tree_mut().add(Node::Constant(Value::Null));
            Some(t.tree_mut().add(Node::Conditional {
                test,
                then,
                otherwise,
            }))
        }
        (_, Some(selector)) => Some(t.with_request(request, |t| {
            let body = t.bind_lambda(expr, request, selector)?;
            t.visit_node(body)
        })?),
        (_, None) => {
            return Err(TranslateError::invalid(
                expr,
                "Aggregating a grouping requires a selector",
            ));
        }
    };

    Ok(t.tree_mut().add(Node::Unary { op, operand }))
}

/// The aggregate replaces the select list of a correlated sub-request.
fn aggregate_sub_request(
    t: &mut Translator<'_>,
    expr: &Expr,
    op: UnaryOp,
    request: RequestId,
    lambda: Option<&Expr>,
) -> Result<NodeId, TranslateError> {
    let operand = aggregate_operand(t, expr, op, request, lambda)?;
    let aggregate = t.tree_mut().add(Node::Unary { op, operand });

    t.tree_mut().clear_select(request);
    t.tree_mut().push_select(request, SelectInfo::new(aggregate));
    t.tree_mut().request_mut(request).projection = Some(expr.ty());

    if let Some(parent) = t.tree().request(request).parent {
        t.set_active(parent);
    }
    Ok(t.tree_mut().add(Node::SubRequest(request)))
}

/// Moves `request` into a derived table and aggregates over it from a new
/// enclosing request, which becomes active.
fn aggregate_derived(
    t: &mut Translator<'_>,
    expr: &Expr,
    op: UnaryOp,
    request: RequestId,
    lambda: Option<&Expr>,
) -> Result<RequestId, TranslateError> {
    let outer_value = if op == UnaryOp::Count {
        if let Some(predicate) = lambda {
            let predicate = t.with_request(request, |t| {
                filter::translate_predicate(t, expr, request, predicate)
            })?;
            filter::apply_filter(t, request, predicate);
        }
        select_counted_rows(t, expr, request)?;
        None
    } else {
        let value = match lambda {
            Some(selector) => t.with_request(request, |t| {
                let body = t.bind_lambda(expr, request, selector)?;
                t.visit_node(body)
            })?,
            None => match t.tree().request(request).select.as_slice() {
                [single] => single.node,
                _ => {
                    return Err(TranslateError::invalid(
                        expr,
                        "Aggregate requires a selector or a single projected value",
                    ));
                }
            },
        };
        t.tree_mut().clear_select(request);
        t.tree_mut().push_select(
            request,
            SelectInfo {
                label: Some(derived_label(0)),
                ..SelectInfo::new(value)
            },
        );
        Some(derived_label(0))
    };

    let (outer, derived) = wrap(t, request);
    let operand = outer_value.map(|label| t.tree_mut().add(Node::column(derived, &label)));
    let aggregate = t.tree_mut().add(Node::Unary { op, operand });
    t.tree_mut().push_select(outer, SelectInfo::new(aggregate));
    t.tree_mut().request_mut(outer).projection = Some(expr.ty());

    debug!("Hoisted {} into a derived table for {op:?}", request);
    Ok(outer)
}

/// Makes sure the counted request selects something a derived table can
/// expose: its group keys, its projection or all of its columns.
fn select_counted_rows(
    t: &mut Translator<'_>,
    expr: &Expr,
    request: RequestId,
) -> Result<(), TranslateError> {
    let r = t.tree().request(request);
    if r.select.is_empty() && r.is_grouped() {
        let keys = r.group_by.clone();
        for key in keys {
            let key = t.tree_mut().duplicate(key);
            t.tree_mut().push_select(request, SelectInfo::new(key));
        }
    }

    if t.tree().request(request).select.is_empty() {
        let from = t
            .tree()
            .request(request)
            .from
            .ok_or_else(|| TranslateError::unsupported(expr, "Request has no source"))?;
        let all = t.tree_mut().add(Node::all_columns(from));
        t.tree_mut().push_select(request, SelectInfo::new(all));
        return Ok(());
    }

    for (index, info) in t.tree_mut().request_mut(request).select.iter_mut().enumerate() {
        info.label = Some(derived_label(index));
    }
    Ok(())
}

fn aggregate_operand(
    t: &mut Translator<'_>,
    expr: &Expr,
    op: UnaryOp,
    request: RequestId,
    lambda: Option<&Expr>,
) -> Result<Option<NodeId>, TranslateError> {
    match (op, lambda) {
        (UnaryOp::Count, None) => Ok(None),
        (UnaryOp::Count, Some(predicate)) => {
            let predicate = t.with_request(request, |t| {
                filter::translate_predicate(t, expr, request, predicate)
            })?;
            filter::apply_filter(t, request, predicate);
            Ok(None)
        }
        (_, Some(selector)) => t
            .with_request(request, |t| {
                let body = t.bind_lambda(expr, request, selector)?;
                t.visit_node(body)
            })
            .map(Some),
        (_, None) => match t.tree().request(request).select.as_slice() {
            [single] => Ok(Some(single.node)),
            _ => Err(TranslateError::invalid(
                expr,
                "Aggregate requires a selector or a single projected value",
            )),
        },
    }
}

/// Creates the request enclosing `inner` as a derived table. Ordering of
/// an unpaged derived table is meaningless and dropped.
fn wrap(t: &mut Translator<'_>, inner: RequestId) -> (RequestId, AliasId) {
    let parent = t.tree().request(inner).parent;
    let tree = t.tree_mut();
    let outer = tree.add_request(parent);
    let derived = tree.add_alias(AliasDefinition::derived(inner));

    let r = tree.request_mut(inner);
    r.parent = Some(outer);
    if !r.is_paged() {
        r.orders.clear();
    }
    tree.request_mut(outer).from = Some(derived);

    t.set_active(outer);
    (outer, derived)
}

pub(crate) fn translate_any(
    t: &mut Translator<'_>,
    expr: &Expr,
    _method: &Method,
    args: &[Expr],
) -> Result<Sql, TranslateError> {
    let receiver = &args[0];
    if receiver.ty().is_grouping() {
        return Err(TranslateError::unsupported(expr, "Any over a grouping"));
    }

    let request = t.receiver_request(expr, receiver)?;
    if let Some(predicate) = args.get(1) {
        let predicate = t.with_request(request, |t| {
            filter::translate_predicate(t, expr, request, predicate)
        })?;
        filter::apply_filter(t, request, predicate);
    }
    if t.tree().request(request).select.is_empty() {
        let from = t
            .tree()
            .request(request)
            .from
            .ok_or_else(|| TranslateError::unsupported(expr, "Request has no source"))?;
        let all = t.tree_mut().add(Node::all_columns(from));
        t.tree_mut().push_select(request, SelectInfo::new(all));
    }

    let sub = t.tree_mut().add(Node::SubRequest(request));
    let exists = t.tree_mut().add(Node::Unary {
        op: UnaryOp::Exists,
        operand: Some(sub),
    });

    if let Some(parent) = t.tree().request(request).parent {
        t.set_active(parent);
        return Ok(Sql::Node(exists));
    }

    // top level: SELECT CASE WHEN EXISTS (..) THEN true ELSE false END
    let tree = t.tree_mut();
    let outer = tree.add_request(None);
    tree.request_mut(request).parent = Some(outer);
    let yes = tree.add(Node::Constant(Value::Boolean(true)));
    let no = tree.add(Node::Constant(Value::Boolean(false)));
    let answer = tree.add(Node::Conditional {
        test: exists,
        then: yes,
        otherwise: no,
    });
    tree.push_select(outer, SelectInfo::new(answer));
    tree.request_mut(outer).projection = Some(TypeRef::boolean());

    t.set_active(outer);
    Ok(Sql::Request(outer))
}

pub fn derived_label(index: usize) -> String {
    format!("{DERIVED_COLUMN_PREFIX}{index}")
}
